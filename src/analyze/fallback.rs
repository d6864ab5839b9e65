// src/analyze/fallback.rs
//! Generic polarity fallback, used only when no rule tier and no token signal fired.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{Classification, Label};

/// Domain-agnostic polarity estimator returning a value in roughly [-1, 1].
pub trait PolarityEstimator: Send + Sync {
    fn polarity(&self, text: &str) -> anyhow::Result<f64>;
    /// Estimator name for diagnostics.
    fn name(&self) -> &'static str;
}

pub const DEFAULT_POSITIVE_THRESHOLD: f64 = 0.1;
pub const DEFAULT_NEGATIVE_THRESHOLD: f64 = -0.1;

/// Confidence for a polarity decision of the fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.6;
/// Confidence for the neutral default (also used when the estimator fails).
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub positive: f64,
    pub negative: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            positive: DEFAULT_POSITIVE_THRESHOLD,
            negative: DEFAULT_NEGATIVE_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Map a continuous polarity to a label. Strict comparisons: a value equal
    /// to a threshold stays Neutral. Neutral results always score 0.0.
    pub fn classify(&self, value: f64) -> Classification {
        if value > self.positive {
            Classification {
                label: Label::Positive,
                score: value,
                confidence: FALLBACK_CONFIDENCE,
            }
        } else if value < self.negative {
            Classification {
                label: Label::Negative,
                score: value,
                confidence: FALLBACK_CONFIDENCE,
            }
        } else {
            neutral_default()
        }
    }
}

/// Neutral result, also used when the estimator fails or returns a
/// non-finite value.
pub fn neutral_default() -> Classification {
    Classification {
        label: Label::Neutral,
        score: 0.0,
        confidence: NEUTRAL_CONFIDENCE,
    }
}

static POLARITY_EN: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../lexicon/polarity_en.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid polarity lexicon")
});

/// Word-list polarity in the AFINN style (-5..=5 per word).
///
/// Polarity = mean(word_score / 5) over scored words, 0.0 when none score.
/// A negator within the 1..=3 preceding tokens inverts a word's sign.
#[derive(Debug, Clone, Default)]
pub struct LexicalPolarity;

impl LexicalPolarity {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *POLARITY_EN.get(w).unwrap_or(&0)
    }
}

impl PolarityEstimator for LexicalPolarity {
    fn polarity(&self, text: &str) -> anyhow::Result<f64> {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut sum = 0.0f64;
        let mut scored = 0usize;

        for i in 0..tokens.len() {
            let base = self.word_score(&tokens[i]);
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(&tokens[i - k]));
            let adj = if negated { -base } else { base };
            sum += f64::from(adj) / 5.0;
            scored += 1;
        }

        if scored == 0 {
            return Ok(0.0);
        }
        Ok((sum / scored as f64).clamp(-1.0, 1.0))
    }

    fn name(&self) -> &'static str {
        "lexical-en"
    }
}

/// Alphanumeric tokens (apostrophes kept for contractions), lowercased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "didn't"
            | "without"
    )
}
