//! Shared-session endpoints: create/adopt a session code, inspect the row,
//! push the current payload, and control the observer live watch.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use seergate_core::error::GateError;
use seergate_core::store::SessionRow;
use seergate_session::cloud::CloudState;
use seergate_session::codes::{is_valid_code, make_session_code};
use seergate_session::live_watch::{self, LIVE_WATCH_INTERVAL};
use seergate_session::payload::SavePayload;

use crate::error::ApiError;
use crate::state::{AppState, CloudHandle};

fn cloud_of(state: &AppState) -> Result<&CloudHandle, ApiError> {
    state
        .cloud
        .as_ref()
        .ok_or_else(|| ApiError(GateError::Validation("cloud is not configured".into())))
}

/// Response for session-code operations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// The active session code.
    pub code: String,
    /// Remote sync indicator.
    pub cloud: CloudState,
}

/// POST /
///
/// Creates a share session: generates a code, writes a blank row, and
/// makes the code the active push target.
#[instrument(skip(state))]
async fn create_session(State(state): State<AppState>) -> Result<Json<SessionResponse>, ApiError> {
    let cloud = cloud_of(&state)?;
    let code = make_session_code(state.entropy.as_ref());
    info!(code, "creating share session");

    *cloud.code.lock().unwrap() = Some(code.clone());
    let blank = serde_json::to_value(SavePayload::blank()).map_err(GateError::from)?;
    cloud.sync.push(&code, &blank).await;

    Ok(Json(SessionResponse {
        code,
        cloud: cloud.sync.state(),
    }))
}

/// Request body for POST /adopt.
#[derive(Debug, Deserialize)]
pub struct AdoptRequest {
    /// Code from a share link.
    pub code: String,
}

/// POST /adopt
///
/// Makes an existing code the active session: boots from its row when the
/// row holds a save, otherwise seeds the row with a blank payload.
#[instrument(skip(state, request), fields(code = %request.code))]
async fn adopt_session(
    State(state): State<AppState>,
    Json(request): Json<AdoptRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let cloud = cloud_of(&state)?;
    let code = request.code.trim().to_uppercase();
    if !is_valid_code(&code) {
        return Err(ApiError(GateError::Validation(format!(
            "malformed session code: {code}"
        ))));
    }

    let row = cloud.store.fetch(&code).await?;
    *cloud.code.lock().unwrap() = Some(code.clone());

    let saved = row.and_then(|row| serde_json::from_value::<SavePayload>(row.payload).ok());
    let payload = {
        let mut session = state.session.lock().await;
        match saved {
            Some(payload) if payload.engine_state.is_some() => {
                session.boot_from_remote(&payload)?
            }
            _ => session.boot()?,
        }
    };
    state.push_cloud(&payload).await;

    Ok(Json(SessionResponse {
        code,
        cloud: cloud.sync.state(),
    }))
}

/// GET /{code}
async fn fetch_session(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<SessionRow>, ApiError> {
    let cloud = cloud_of(&state)?;
    let code = code.trim().to_uppercase();
    let row = cloud
        .store
        .fetch(&code)
        .await?
        .ok_or(GateError::SessionNotFound(code))?;
    Ok(Json(row))
}

/// POST /push
///
/// Pushes the current save payload to the active session row immediately.
#[instrument(skip(state))]
async fn push_now(State(state): State<AppState>) -> Result<Json<SessionResponse>, ApiError> {
    let cloud = cloud_of(&state)?;
    let Some(code) = cloud.current_code() else {
        return Err(ApiError(GateError::Validation(
            "no active session code".into(),
        )));
    };
    let payload = {
        let session = state.session.lock().await;
        session.build_payload()?
    };
    state.push_cloud(&payload).await;
    Ok(Json(SessionResponse {
        code,
        cloud: cloud.sync.state(),
    }))
}

/// Response for the watch endpoints.
#[derive(Debug, Serialize)]
pub struct WatchResponse {
    /// Whether a live watch is now running.
    pub watching: bool,
}

/// POST /{code}/watch
///
/// Starts the observer live watch for a code. A watch already running is
/// replaced.
#[instrument(skip(state))]
async fn start_watch(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<WatchResponse>, ApiError> {
    let cloud = cloud_of(&state)?;
    let code = code.trim().to_uppercase();
    if cloud.store.fetch(&code).await?.is_none() {
        return Err(ApiError(GateError::SessionNotFound(code)));
    }

    info!(code, "starting live watch");
    let watch = live_watch::spawn(
        state.session.clone(),
        cloud.store.clone(),
        code.clone(),
        LIVE_WATCH_INTERVAL,
    );
    *cloud.code.lock().unwrap() = Some(code);
    *cloud.watch.lock().unwrap() = Some(watch);
    Ok(Json(WatchResponse { watching: true }))
}

/// DELETE /{code}/watch
#[instrument(skip(state))]
async fn stop_watch(
    State(state): State<AppState>,
    Path(_code): Path<String>,
) -> Result<Json<WatchResponse>, ApiError> {
    let cloud = cloud_of(&state)?;
    // Dropping the handle aborts the poller.
    cloud.watch.lock().unwrap().take();
    Ok(Json(WatchResponse { watching: false }))
}

/// Returns the router for the session surface.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/adopt", post(adopt_session))
        .route("/push", post(push_now))
        .route("/{code}", get(fetch_session))
        .route("/{code}/watch", post(start_watch).delete(stop_watch))
}
