//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use seergate_api::state::{AppState, CloudHandle};
use seergate_core::clock::Clock;
use seergate_core::rng::RandomSource;
use seergate_core::store::SessionStore;
use seergate_divination::deck::Deck;
use seergate_engine::scripted::ScriptedStory;
use seergate_session::controller::TrialSession;
use seergate_test_support::{FixedClock, FixedRandomSource, MemoryDocumentStore};

/// Fixed timestamp used across all integration tests.
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// A two-passage trial: one prompt with two choices, then a realm ending
/// with a memory tag and a three-card draw.
pub fn trial_script() -> serde_json::Value {
    serde_json::json!({
        "start": "gate",
        "vars": { "spread_seed": 42, "favor": 1 },
        "passages": {
            "gate": {
                "beats": [
                    { "text": "The Gate regards you.", "tags": ["gate:curious", "realm:threshold", "scene:trial"] },
                    { "text": "First question.", "tags": ["prompt:p1", "q:What do you carry?"] }
                ],
                "choices": [
                    { "text": "A secret", "target": "ending" },
                    { "text": "Nothing", "target": "ending" }
                ]
            },
            "ending": {
                "beats": [
                    { "text": "The realm closes.", "tags": ["scene:end", "mem:+truth", "sig:+guarded", "draw:3"] }
                ]
            }
        }
    })
}

/// Builds application state over the given script, booted and ready.
pub fn state_with_script(
    script: &serde_json::Value,
    cloud_store: Option<Arc<dyn SessionStore>>,
) -> AppState {
    let clock = fixed_clock();
    let local = Arc::new(MemoryDocumentStore::new());
    let deck = Deck::builtin();
    let engine = ScriptedStory::from_json(&script.to_string()).unwrap();
    let mut session = TrialSession::new(
        Box::new(engine),
        deck.clone(),
        local.clone(),
        clock.clone(),
    );
    session.boot().unwrap();

    let entropy: Arc<dyn RandomSource> =
        Arc::new(FixedRandomSource((0..18).collect::<Vec<u8>>()));
    let cloud = cloud_store.map(|store| CloudHandle::new(store, clock.clone()));
    AppState::new(
        Arc::new(tokio::sync::Mutex::new(session)),
        local,
        deck,
        clock,
        entropy,
        cloud,
    )
}

/// Build the full app router without cloud sessions.
pub fn build_test_app() -> Router {
    seergate_api::app(state_with_script(&trial_script(), None))
}

/// Build the full app router plus its state, for tests that assert on the
/// state after requests.
pub fn build_test_app_with_cloud(store: Arc<dyn SessionStore>) -> (Router, AppState) {
    let state = state_with_script(&trial_script(), Some(store));
    (seergate_api::app(state.clone()), state)
}

/// Session code `FixedRandomSource(0..18)` generates.
pub const TEST_CODE: &str = "ABCDEFGHJKLMNPQRST";

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a bodyless POST request and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value =
        serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}
