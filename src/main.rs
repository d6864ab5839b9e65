//! Feedback Sentiment Service — Binary Entrypoint
//! Boots the Axum HTTP server with the rule-based classifier, metrics and
//! optional rule-book hot reload.

use feedback_sentiment::analyze::{start_hot_reload_thread, trace::dev_logging_enabled};
use feedback_sentiment::metrics::Metrics;
use feedback_sentiment::{api, app_state, SentimentConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - SENTIMENT_DEV_LOG=1
fn enable_dev_tracing() {
    if !dev_logging_enabled() {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sentiment=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let cfg = SentimentConfig::load_default()?;
    let state = app_state(&cfg)?;

    // If hot reload is enabled, spawn background watcher
    start_hot_reload_thread(state.classifier.clone(), cfg.clone());

    let metrics = Metrics::init(cfg.thresholds())?;
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
