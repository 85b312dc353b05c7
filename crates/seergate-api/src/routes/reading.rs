//! Reading synthesis and export endpoints.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Json, Router, routing::get};
use serde::Deserialize;

use seergate_divination::reading::{REALM_FILTER_ALL, Reading, reading_to_text};

use crate::state::AppState;

/// Query parameters for the reading endpoints.
#[derive(Debug, Deserialize)]
pub struct ReadingQuery {
    /// Realm filter; `all` (the default) passes everything through.
    pub realm: Option<String>,
}

async fn synthesize(state: &AppState, query: &ReadingQuery) -> Reading {
    let filter = query.realm.as_deref().unwrap_or(REALM_FILTER_ALL);
    let session = state.session.lock().await;
    session.reading(filter)
}

/// GET /
async fn reading(
    State(state): State<AppState>,
    Query(query): Query<ReadingQuery>,
) -> Json<Reading> {
    Json(synthesize(&state, &query).await)
}

/// GET /export.txt
///
/// The shareable plain-text rendition, where a browser front end would
/// copy to the clipboard.
async fn export_text(
    State(state): State<AppState>,
    Query(query): Query<ReadingQuery>,
) -> impl IntoResponse {
    let text = reading_to_text(&synthesize(&state, &query).await);
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text)
}

/// GET /export.json
///
/// The reading as a downloadable document.
async fn export_json(
    State(state): State<AppState>,
    Query(query): Query<ReadingQuery>,
) -> impl IntoResponse {
    let reading = synthesize(&state, &query).await;
    (
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"reading.json\"",
        )],
        Json(reading),
    )
}

/// Returns the router for the reading surface.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reading))
        .route("/export.txt", get(export_text))
        .route("/export.json", get(export_json))
}
