//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use everloop_api::routes;
use everloop_api::state::AppState;
use everloop_core::clock::Clock;
use everloop_core::generator::NarrativeGenerator;
use everloop_ledger_store::memory_ledger_store::InMemoryLedgerStore;
use everloop_test_support::{FixedClock, ScriptedGenerator};

/// Fixed timestamp used across all integration tests.
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router over an in-memory store and a generator
/// with no scripted responses (every narrative call fails). The router
/// is cheap to clone and clones share state, so drive every request in
/// a test through the same instance.
pub fn build_test_app() -> Router {
    build_test_app_with_generator(Arc::new(ScriptedGenerator::new(vec![])))
}

/// Build the full app router with a custom generator for tests that
/// exercise narrative continuations.
pub fn build_test_app_with_generator(generator: Arc<dyn NarrativeGenerator>) -> Router {
    let store = Arc::new(InMemoryLedgerStore::new());
    routes::app(AppState::new(store, generator, fixed_clock()))
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
