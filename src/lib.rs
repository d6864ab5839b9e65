// src/lib.rs
// Public library surface for integration tests and the feedback service.

pub mod api;
pub mod config;
pub mod metrics;

// Rule pipeline (normalizer, lexicon, tiers, token scan, fallback)
pub mod analyze;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{
    default_classifier, Classification, Classifier, ClassifierHandle, Explanation, Label,
};
pub use crate::api::{router, AppState};
pub use crate::config::SentimentConfig;

use tracing::info;

/// Classify one feedback text with the built-in Dutch rule book and default
/// thresholds. Never fails; empty input yields a Neutral result.
pub fn analyze(text: &str) -> Classification {
    default_classifier().classify(text)
}

/// Build shared service state from resolved configuration.
pub fn app_state(cfg: &SentimentConfig) -> anyhow::Result<AppState> {
    let handle = ClassifierHandle::from_config(cfg)?;
    info!(
        target: "sentiment",
        classifier = ?handle.current(),
        rules = ?cfg.rules_path,
        "sentiment classifier ready"
    );
    Ok(AppState::new(handle))
}
