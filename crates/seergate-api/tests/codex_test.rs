//! Integration tests for the codex surface.

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_codex_starts_fully_shrouded() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app, "/api/v1/codex/cards").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["discovered"], 0);
    let cards = json["cards"].as_array().unwrap();
    assert_eq!(cards.len(), json["total"].as_u64().unwrap() as usize);
    for card in cards {
        assert!(card["name"].is_null());
        assert!(card["unlock"].is_null());
        assert!(!card["id"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_draw_unlocks_exactly_the_drawn_cards() {
    let app = common::build_test_app();
    let (_, view) = common::post_json(
        app.clone(),
        "/api/v1/trial/choice",
        &serde_json::json!({ "index": 0 }),
    )
    .await;
    let drawn: Vec<&str> = view["spread"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(drawn.len(), 3);

    let (status, json) = common::get_json(app, "/api/v1/codex/cards").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["discovered"], 3);
    for card in json["cards"].as_array().unwrap() {
        let id = card["id"].as_str().unwrap();
        if drawn.contains(&id) {
            assert!(card["name"].is_string(), "{id} should be revealed");
            assert_eq!(card["unlock"]["timesSeen"], 1);
        } else {
            assert!(card["name"].is_null(), "{id} should stay shrouded");
        }
    }
}

#[tokio::test]
async fn test_history_records_finalized_runs() {
    let app = common::build_test_app();
    common::post_json(
        app.clone(),
        "/api/v1/trial/choice",
        &serde_json::json!({ "index": 0 }),
    )
    .await;

    let (_, empty) = common::get_json(app.clone(), "/api/v1/codex/history").await;
    assert_eq!(empty.as_array().unwrap().len(), 0);

    common::post_empty(app.clone(), "/api/v1/trial/new").await;

    let (status, json) = common::get_json(app, "/api/v1/codex/history").await;
    assert_eq!(status, StatusCode::OK);
    let runs = json.as_array().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["realmKey"], "threshold");
    assert_eq!(runs[0]["seed"], 42);
    assert_eq!(runs[0]["cardIds"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_gate_memory_tallies_completed_realms() {
    let app = common::build_test_app();
    common::post_json(
        app.clone(),
        "/api/v1/trial/choice",
        &serde_json::json!({ "index": 0 }),
    )
    .await;

    let (status, json) = common::get_json(app, "/api/v1/codex/memory").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["trials"], 1);
    assert_eq!(json["counts"]["truth"], 1);
    assert_eq!(json["counts"]["rage"], 0);
    assert!(json["lastSeen"]["truth"].is_string());
    assert!(json["lastSeen"]["rage"].is_null());
}
