//! Integration tests for the shared-session surface.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use seergate_test_support::RecordingSessionStore;

#[tokio::test]
async fn test_create_session_writes_a_blank_row_and_activates_the_code() {
    let store = Arc::new(RecordingSessionStore::new());
    let (app, state) = common::build_test_app_with_cloud(store.clone());

    let (status, json) = common::post_empty(app, "/api/v1/sessions").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], common::TEST_CODE);
    assert_eq!(json["cloud"]["status"], "synced");

    let upserts = store.upserts();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].0, common::TEST_CODE);
    assert!(upserts[0].1["engineState"].is_null());

    let cloud = state.cloud.as_ref().unwrap();
    assert_eq!(cloud.current_code().as_deref(), Some(common::TEST_CODE));
}

#[tokio::test]
async fn test_trial_mutations_push_to_the_active_session_row() {
    let store = Arc::new(RecordingSessionStore::new());
    let (app, _state) = common::build_test_app_with_cloud(store.clone());
    common::post_empty(app.clone(), "/api/v1/sessions").await;

    common::post_json(
        app,
        "/api/v1/trial/choice",
        &serde_json::json!({ "index": 0, "note": "kept between us" }),
    )
    .await;

    let upserts = store.upserts();
    assert_eq!(upserts.len(), 2, "blank create plus one autosave push");
    let pushed = &upserts[1].1;
    assert!(pushed["engineState"].is_string());
    assert_eq!(pushed["ui"]["scene"], "end");
    assert_eq!(pushed["ui"]["realmKey"], "threshold");
}

#[tokio::test]
async fn test_without_active_code_nothing_is_pushed() {
    let store = Arc::new(RecordingSessionStore::new());
    let (app, _state) = common::build_test_app_with_cloud(store.clone());

    common::post_json(
        app,
        "/api/v1/trial/choice",
        &serde_json::json!({ "index": 0 }),
    )
    .await;

    assert!(store.upserts().is_empty());
}

#[tokio::test]
async fn test_fetch_unknown_code_returns_404() {
    let store = Arc::new(RecordingSessionStore::new());
    let (app, _state) = common::build_test_app_with_cloud(store);

    let (status, json) = common::get_json(app, "/api/v1/sessions/NOSUCHCODE").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "session_not_found");
}

#[tokio::test]
async fn test_fetch_returns_the_stored_row() {
    let store = Arc::new(RecordingSessionStore::new());
    let (app, _state) = common::build_test_app_with_cloud(store.clone());
    common::post_empty(app.clone(), "/api/v1/sessions").await;

    let (status, json) =
        common::get_json(app, &format!("/api/v1/sessions/{}", common::TEST_CODE)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], common::TEST_CODE);
    assert!(json["payload"]["ui"].is_object());
}

#[tokio::test]
async fn test_adopt_boots_from_a_row_holding_a_save() {
    let store = Arc::new(RecordingSessionStore::new());

    // A previous player pushed a save to this code.
    let (app, _state) = common::build_test_app_with_cloud(store.clone());
    common::post_empty(app.clone(), "/api/v1/sessions").await;
    common::post_json(
        app,
        "/api/v1/trial/choice",
        &serde_json::json!({ "index": 0 }),
    )
    .await;

    // A fresh process adopts the same code.
    let (app, _state) = common::build_test_app_with_cloud(store);
    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/sessions/adopt",
        &serde_json::json!({ "code": common::TEST_CODE.to_lowercase() }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], common::TEST_CODE);
    let (_, view) = common::get_json(app, "/api/v1/trial/state").await;
    assert_eq!(view["scene"], "end");
    assert_eq!(view["spread"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_adopt_rejects_a_malformed_code() {
    let store = Arc::new(RecordingSessionStore::new());
    let (app, _state) = common::build_test_app_with_cloud(store);

    let (status, json) = common::post_json(
        app,
        "/api/v1/sessions/adopt",
        &serde_json::json!({ "code": "bad-code!" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_session_surface_requires_cloud_configuration() {
    let app = common::build_test_app();

    let (status, json) = common::post_empty(app, "/api/v1/sessions").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_watch_lifecycle_for_an_existing_row() {
    let store = Arc::new(RecordingSessionStore::new());
    let (app, state) = common::build_test_app_with_cloud(store);
    common::post_empty(app.clone(), "/api/v1/sessions").await;

    let (status, json) = common::post_empty(
        app.clone(),
        &format!("/api/v1/sessions/{}/watch", common::TEST_CODE),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["watching"], true);
    assert!(state.cloud.as_ref().unwrap().watch.lock().unwrap().is_some());

    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/sessions/{}/watch", common::TEST_CODE))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.cloud.as_ref().unwrap().watch.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_watch_for_unknown_code_returns_404() {
    let store = Arc::new(RecordingSessionStore::new());
    let (app, _state) = common::build_test_app_with_cloud(store);

    let (status, json) =
        common::post_empty(app, "/api/v1/sessions/NOSUCHCODE/watch").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "session_not_found");
}

#[tokio::test]
async fn test_push_without_active_code_is_a_validation_error() {
    let store = Arc::new(RecordingSessionStore::new());
    let (app, _state) = common::build_test_app_with_cloud(store);

    let (status, json) = common::post_empty(app, "/api/v1/sessions/push").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}
