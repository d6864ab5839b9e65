// src/analyze/mod.rs
//! Classification pipeline entry.
//!
//! Order (first stage that yields a result wins):
//! 1) phrase tiers of the rule book, ascending priority
//! 2) token scan (negation/intensifier aware counts)
//! 3) generic polarity fallback (always yields)

pub mod fallback;
pub mod fuzzy;
pub mod lexicon;
pub mod normalize;
pub mod reload;
pub mod rules;
pub mod scoring;
pub mod trace;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::analyze::fallback::{neutral_default, LexicalPolarity, PolarityEstimator, Thresholds};
use crate::analyze::normalize::Normalized;
use crate::analyze::rules::{RuleBook, RuleTier};
use crate::analyze::scoring::{scan_tokens, TokenCounts};
use crate::config::SentimentConfig;

// Re-export convenient types.
pub use crate::analyze::reload::{start_hot_reload_thread, ClassifierHandle};

pub const STAGE_TOKEN_SCAN: &str = "token_scan";
pub const STAGE_FALLBACK: &str = "fallback";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Positive,
    Negative,
    Neutral,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "Positive",
            Label::Negative => "Negative",
            Label::Neutral => "Neutral",
        }
    }
}

/// `(label, score, confidence)` of one text.
///
/// Fallback scores lie in [-1, 1]; rule outcomes may exceed that range
/// (e.g. `-0.7 - 0.2 * n` from the token scan) as an intensity signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: Label,
    pub score: f64,
    pub confidence: f64,
}

/// Full account of how a text was classified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    #[serde(flatten)]
    pub result: Classification,
    /// Deciding stage: a tier name, `token_scan` or `fallback`.
    pub stage: String,
    /// Pattern (or misspelled form) that triggered a phrase tier.
    pub matched: Option<String>,
    /// Canonical word behind a spelling-variant hit.
    pub canonical: Option<String>,
    /// Token-scan counters, when the scan ran.
    pub counts: Option<TokenCounts>,
    /// Stages evaluated, in order, ending with the deciding one.
    pub evaluated: Vec<String>,
    /// Set when the fallback estimator failed and the neutral default was used.
    pub fallback_error: Option<String>,
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "sentiment_classifications_total",
            "Classified texts by deciding stage and label."
        );
        describe_counter!(
            "sentiment_fallback_errors_total",
            "Fallback estimator failures downgraded to Neutral."
        );
        describe_histogram!(
            "sentiment_classify_us",
            "Classification latency in microseconds."
        );
        describe_gauge!("sentiment_positive_threshold", "Fallback positive threshold.");
        describe_gauge!("sentiment_negative_threshold", "Fallback negative threshold.");
    });
}

/// Immutable classifier: rule book + fallback thresholds + estimator.
/// `Send + Sync`; share it behind `Arc` (see `ClassifierHandle`).
pub struct Classifier {
    rules: RuleBook,
    thresholds: Thresholds,
    estimator: Arc<dyn PolarityEstimator>,
    trace: bool,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("tiers", &self.rules.tiers().len())
            .field("thresholds", &self.thresholds)
            .field("estimator", &self.estimator.name())
            .field("trace", &self.trace)
            .finish()
    }
}

/// A stage that fired.
struct Hit {
    result: Classification,
    matched: Option<String>,
    canonical: Option<String>,
}

impl Classifier {
    pub fn new(rules: RuleBook, thresholds: Thresholds) -> Self {
        Self {
            rules,
            thresholds,
            estimator: Arc::new(LexicalPolarity::new()),
            trace: false,
        }
    }

    /// Built-in Dutch rule book with default thresholds.
    pub fn builtin() -> anyhow::Result<Self> {
        Ok(Self::new(RuleBook::builtin()?, Thresholds::default()))
    }

    pub fn from_config(cfg: &SentimentConfig) -> anyhow::Result<Self> {
        let rules = match &cfg.rules_path {
            Some(p) => RuleBook::from_path(p)?,
            None => RuleBook::builtin()?,
        };
        Ok(Self::new(rules, cfg.thresholds()).with_trace(cfg.trace))
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn PolarityEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_trace(mut self, on: bool) -> Self {
        self.trace = on;
        self
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Classify one text. Total: every input yields a result.
    pub fn classify(&self, text: &str) -> Classification {
        self.explain(text).result
    }

    pub fn explain(&self, text: &str) -> Explanation {
        ensure_metrics_described();
        let started = Instant::now();
        let norm = Normalized::new(text);
        let id = if self.trace {
            Some(trace::anon_hash(text))
        } else {
            None
        };
        let mut evaluated = Vec::new();

        for tier in self.rules.tiers() {
            evaluated.push(tier.name.clone());
            let hit = phrase_tier(tier, &norm);
            if let Some(id) = &id {
                let matched = hit.as_ref().and_then(|h| h.matched.as_deref());
                trace::stage_event(id, &tier.name, hit.is_some(), matched);
            }
            if let Some(hit) = hit {
                return finish(tier.name.clone(), hit, None, evaluated, None, started);
            }
        }

        evaluated.push(STAGE_TOKEN_SCAN.to_string());
        let counts = scan_tokens(&norm, &self.rules.lexicon);
        let verdict = counts.verdict();
        if let Some(id) = &id {
            trace::stage_event(id, STAGE_TOKEN_SCAN, verdict.is_some(), None);
        }
        if let Some(result) = verdict {
            let hit = Hit {
                result,
                matched: None,
                canonical: None,
            };
            return finish(STAGE_TOKEN_SCAN.into(), hit, Some(counts), evaluated, None, started);
        }

        evaluated.push(STAGE_FALLBACK.to_string());
        let (result, error) = self.fallback(text);
        if let Some(id) = &id {
            trace::stage_event(id, STAGE_FALLBACK, true, None);
        }
        let hit = Hit {
            result,
            matched: None,
            canonical: None,
        };
        finish(STAGE_FALLBACK.into(), hit, Some(counts), evaluated, error, started)
    }

    /// Generic estimator over the original text. Failures and non-finite
    /// values degrade to Neutral/0.5 instead of propagating.
    fn fallback(&self, text: &str) -> (Classification, Option<String>) {
        let err = match self.estimator.polarity(text) {
            Ok(v) if v.is_finite() => return (self.thresholds.classify(v), None),
            Ok(v) => format!("{} returned non-finite polarity {v}", self.estimator.name()),
            Err(e) => format!("{}: {e:#}", self.estimator.name()),
        };
        counter!("sentiment_fallback_errors_total").increment(1);
        warn!(target: "sentiment", error = %err, "fallback estimator failed; using neutral default");
        (neutral_default(), Some(err))
    }
}

fn phrase_tier(tier: &RuleTier, norm: &Normalized) -> Option<Hit> {
    tier.first_hit(norm).map(|h| Hit {
        result: tier.outcome,
        matched: Some(h.pattern),
        canonical: h.canonical,
    })
}

fn finish(
    stage: String,
    hit: Hit,
    counts: Option<TokenCounts>,
    evaluated: Vec<String>,
    fallback_error: Option<String>,
    started: Instant,
) -> Explanation {
    counter!(
        "sentiment_classifications_total",
        "stage" => stage.clone(),
        "label" => hit.result.label.as_str()
    )
    .increment(1);
    histogram!("sentiment_classify_us").record(started.elapsed().as_micros() as f64);

    Explanation {
        result: hit.result,
        stage,
        matched: hit.matched,
        canonical: hit.canonical,
        counts,
        evaluated,
        fallback_error,
    }
}

static DEFAULT_CLASSIFIER: Lazy<Classifier> =
    Lazy::new(|| Classifier::builtin().expect("built-in rule book is valid"));

/// Process-wide classifier built from the built-in rule book.
pub fn default_classifier() -> &'static Classifier {
    &DEFAULT_CLASSIFIER
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;
    impl PolarityEstimator for Failing {
        fn polarity(&self, _text: &str) -> anyhow::Result<f64> {
            anyhow::bail!("estimator offline")
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Fixed(f64);
    impl PolarityEstimator for Fixed {
        fn polarity(&self, _text: &str) -> anyhow::Result<f64> {
            Ok(self.0)
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn with(est: Arc<dyn PolarityEstimator>) -> Classifier {
        Classifier::builtin().unwrap().with_estimator(est)
    }

    #[test]
    fn first_matching_tier_short_circuits() {
        let c = Classifier::builtin().unwrap();
        let e = c.explain("de uitleg is niet goed");
        assert_eq!(e.stage, "negated_positive");
        assert_eq!(e.evaluated, vec!["negated_positive"]);
        assert_eq!(e.matched.as_deref(), Some("niet goed"));
        assert_eq!(e.result.label, Label::Negative);
    }

    #[test]
    fn token_scan_runs_after_all_tiers() {
        let c = Classifier::builtin().unwrap();
        let e = c.explain("de lessen zijn slecht");
        assert_eq!(e.stage, STAGE_TOKEN_SCAN);
        assert_eq!(e.evaluated.len(), c.rules().tiers().len() + 1);
        assert_eq!(e.counts, Some(TokenCounts { negative: 2, positive: 0 }));
    }

    #[test]
    fn failing_estimator_degrades_to_neutral() {
        let c = with(Arc::new(Failing));
        let e = c.explain("niets bijzonders");
        assert_eq!(e.stage, STAGE_FALLBACK);
        assert_eq!(e.result, neutral_default());
        assert!(e.fallback_error.unwrap().contains("estimator offline"));
    }

    #[test]
    fn non_finite_polarity_degrades_to_neutral() {
        let c = with(Arc::new(Fixed(f64::NAN)));
        assert_eq!(c.classify("niets bijzonders"), neutral_default());
    }

    #[test]
    fn fallback_uses_thresholds() {
        let c = with(Arc::new(Fixed(0.35)));
        let r = c.classify("niets bijzonders");
        assert_eq!(r.label, Label::Positive);
        assert_eq!(r.score, 0.35);
        assert_eq!(r.confidence, fallback::FALLBACK_CONFIDENCE);

        let strict = Classifier::new(
            RuleBook::builtin().unwrap(),
            Thresholds { positive: 0.5, negative: -0.5 },
        )
        .with_estimator(Arc::new(Fixed(0.35)));
        assert_eq!(strict.classify("niets bijzonders").label, Label::Neutral);
    }

    #[test]
    fn estimator_not_consulted_when_rules_fire() {
        let c = with(Arc::new(Failing));
        let e = c.explain("geweldig");
        assert_eq!(e.stage, "strong_positive");
        assert!(e.fallback_error.is_none());
    }

    #[test]
    fn tracing_does_not_change_results() {
        let plain = Classifier::builtin().unwrap();
        let traced = Classifier::builtin().unwrap().with_trace(true);
        for t in ["", "heel slegt uitgelegd", "top!", "nice"] {
            assert_eq!(plain.explain(t), traced.explain(t));
        }
    }
}
