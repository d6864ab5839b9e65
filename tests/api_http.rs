// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /analyze
// - POST /batch
// - GET /debug/explain

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use feedback_sentiment::{api, AppState, Classifier, ClassifierHandle};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Build the same Router the binary uses, with the built-in rule book.
fn test_router() -> Router {
    let classifier = Classifier::builtin().expect("built-in rule book");
    api::router(AppState::new(ClassifierHandle::new(classifier)))
}

async fn read_json(resp: shuttle_axum::axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "ok");
}

#[tokio::test]
async fn api_analyze_returns_label_score_confidence() {
    let app = test_router();

    let payload = json!({ "text": "De leerkrachten zijn racistisch" });
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /analyze");

    let resp = app.oneshot(req).await.expect("oneshot /analyze");
    assert!(
        resp.status().is_success(),
        "POST /analyze should be 2xx, got {}",
        resp.status()
    );

    let v = read_json(resp).await;
    assert_eq!(v["label"], "Negative");
    assert_eq!(v["score"].as_f64(), Some(-0.8));
    assert_eq!(v["confidence"].as_f64(), Some(0.9));
}

#[tokio::test]
async fn api_analyze_accepts_empty_text() {
    let app = test_router();

    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"text":""}"#))
        .expect("build POST /analyze");

    let resp = app.oneshot(req).await.expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["label"], "Neutral");
    assert_eq!(v["confidence"].as_f64(), Some(0.5));
}

#[tokio::test]
async fn api_analyze_rejects_missing_text_field() {
    let app = test_router();

    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"comment":"goed"}"#))
        .expect("build POST /analyze");

    let resp = app.oneshot(req).await.expect("oneshot /analyze");
    assert!(
        resp.status().is_client_error(),
        "missing `text` should be 4xx, got {}",
        resp.status()
    );
}

#[tokio::test]
async fn api_batch_preserves_order() {
    let app = test_router();

    let payload = json!([
        { "text": "Fantastische docenten" },
        { "text": "Redelijk goed, kan beter" },
        { "text": "de uitleg is niet goed" }
    ]);
    let req = Request::builder()
        .method("POST")
        .uri("/batch")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /batch");

    let resp = app.oneshot(req).await.expect("oneshot /batch");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    let labels: Vec<&str> = v
        .as_array()
        .expect("batch returns an array")
        .iter()
        .map(|r| r["label"].as_str().expect("label string"))
        .collect();
    assert_eq!(labels, ["Positive", "Neutral", "Negative"]);
}

#[tokio::test]
async fn api_debug_explain_reports_stage_and_match() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/debug/explain?text=lessen%20zijn%20onozzel")
        .body(Body::empty())
        .expect("build GET /debug/explain");

    let resp = app.oneshot(req).await.expect("oneshot /debug/explain");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["stage"], "strong_negative_variant");
    assert_eq!(v["matched"], "onozzel");
    assert_eq!(v["canonical"], "onnozel");
    assert_eq!(v["label"], "Negative");
    assert!(v["evaluated"].as_array().is_some_and(|a| a.len() == 5));
}
