// src/analyze/scoring.rs
//! Token scan: negation- and intensifier-aware counting of lexical signal.
//!
//! Per token (left to right), with `key` = token stripped of edge punctuation:
//! - negator + negatable-negative      -> skipped (double negation is neutral)
//! - negator + negatable-positive      -> negative += 1
//! - negator + diminisher + neg.-pos.  -> negative += 1
//! - strong-negative word              -> negative += 2
//! - mild-negative word                -> negative += 1
//! - otherwise misspelled strong-neg.  -> negative += 2 (variant map, then fuzzy)
//! - positive word (independently)     -> positive += 1, +1 after an intensifier
//!
//! Negator/diminisher lookback compares raw tokens, so negation does not reach
//! across sentence punctuation ("niet. goed"). The intensifier lookback uses
//! the stripped key.

use serde::Serialize;

use super::lexicon::{Lexicon, PolarityClass};
use super::normalize::{lookup_key, Normalized};
use super::{Classification, Label};

pub const TOKEN_CONFIDENCE: f64 = 0.8;

/// Accumulated lexical signal of one scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TokenCounts {
    pub negative: u32,
    pub positive: u32,
}

impl TokenCounts {
    pub fn is_empty(&self) -> bool {
        self.negative == 0 && self.positive == 0
    }

    /// Negative signal dominates; `None` when nothing was found.
    pub fn verdict(&self) -> Option<Classification> {
        if self.negative > 0 {
            Some(Classification {
                label: Label::Negative,
                score: -0.7 - 0.2 * self.negative as f64,
                confidence: TOKEN_CONFIDENCE,
            })
        } else if self.positive > 0 {
            Some(Classification {
                label: Label::Positive,
                score: 0.7 + 0.1 * self.positive as f64,
                confidence: TOKEN_CONFIDENCE,
            })
        } else {
            None
        }
    }
}

pub fn scan_tokens(text: &Normalized, lx: &Lexicon) -> TokenCounts {
    let tokens = &text.tokens;
    let keys: Vec<&str> = tokens.iter().map(|t| lookup_key(t)).collect();
    let mut counts = TokenCounts::default();

    for (i, &key) in keys.iter().enumerate() {
        let prev_negator = i >= 1 && lx.is_negator(&tokens[i - 1]);

        if prev_negator && lx.is_negatable_negative(key) {
            continue;
        }
        if prev_negator && lx.is_negatable_positive(key) {
            counts.negative += 1;
            continue;
        }
        if i >= 2
            && lx.is_negator(&tokens[i - 2])
            && lx.is_diminisher(&tokens[i - 1])
            && lx.is_negatable_positive(key)
        {
            counts.negative += 1;
            continue;
        }

        if lx.has_class(key, PolarityClass::StrongNegative) {
            counts.negative += 2;
        } else if lx.has_class(key, PolarityClass::Negative) {
            counts.negative += 1;
        } else if lx.misspelled_strong_negative(key).is_some() {
            counts.negative += 2;
        }

        if lx.has_class(key, PolarityClass::Positive) {
            let boost = u32::from(i >= 1 && lx.is_intensifier(keys[i - 1]));
            counts.positive += 1 + boost;
        }

        if let Some(class) = lx.phrase_ending_at(&keys[..=i]) {
            match class {
                PolarityClass::StrongNegative => counts.negative += 2,
                PolarityClass::Negative => counts.negative += 1,
                PolarityClass::Positive => counts.positive += 1,
            }
        }
    }

    counts
}
