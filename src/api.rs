use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::analyze::{Classification, ClassifierHandle, Explanation};

#[derive(Clone)]
pub struct AppState {
    pub classifier: ClassifierHandle,
}

impl AppState {
    pub fn new(classifier: ClassifierHandle) -> Self {
        Self { classifier }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/batch", post(analyze_batch))
        .route("/debug/explain", get(debug_explain))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    text: String,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Json<Classification> {
    Json(state.classifier.analyze(&body.text))
}

/// One snapshot for the whole batch, so a concurrent reload cannot split it.
async fn analyze_batch(
    State(state): State<AppState>,
    Json(items): Json<Vec<AnalyzeReq>>,
) -> Json<Vec<Classification>> {
    let classifier = state.classifier.current();
    let out = items
        .iter()
        .map(|it| classifier.classify(&it.text))
        .collect::<Vec<_>>();
    Json(out)
}

/// GET /debug/explain?text=...
async fn debug_explain(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Explanation> {
    let text = q.get("text").cloned().unwrap_or_default();
    Json(state.classifier.explain(&text))
}
