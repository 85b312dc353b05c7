//! Routes driving the live trial.
//!
//! Every mutating endpoint advances the session, autosaves locally, pushes
//! the same payload to the active session row (when one is set), and
//! returns the refreshed view.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use seergate_divination::draw::DrawnCard;
use seergate_divination::phrases;
use seergate_engine::stats::TrialStats;
use seergate_session::cloud::CloudState;
use seergate_session::controller::TrialSession;
use seergate_session::state::RealmEndReading;

use crate::error::ApiError;
use crate::state::AppState;

/// One selectable choice as rendered to clients.
#[derive(Debug, Serialize)]
pub struct ChoiceView {
    /// Index to send back on selection.
    pub index: usize,
    /// Display text.
    pub text: String,
}

/// The full view of the trial at a rest point.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialView {
    /// The Gate's mood.
    pub gate_mood: String,
    /// Current scene id.
    pub scene: String,
    /// Current realm id.
    pub realm_key: String,
    /// Display label for the realm.
    pub realm_label: String,
    /// The current spread.
    pub spread: Vec<DrawnCard>,
    /// Reading synthesized by the latest draw, if still current.
    pub realm_end_reading: Option<RealmEndReading>,
    /// Transcript of emitted lines and sealed whispers.
    pub log: Vec<String>,
    /// Choices on offer.
    pub choices: Vec<ChoiceView>,
    /// Whether the story is halted for name input.
    pub awaiting_name: bool,
    /// Whether the story has ended.
    pub ended: bool,
    /// Pending prompt id.
    pub prompt_id: Option<String>,
    /// Pending prompt question.
    pub prompt_title: Option<String>,
    /// Engine statistics.
    pub stats: TrialStats,
    /// The Gate's live hint based on the dominant signal.
    pub gate_hint: String,
    /// Remote sync indicator, absent when no database is configured.
    pub cloud: Option<CloudState>,
}

fn view_of(session: &TrialSession, cloud: Option<CloudState>) -> TrialView {
    let state = session.state();
    TrialView {
        gate_mood: state.mood.clone(),
        scene: state.scene.clone(),
        realm_key: state.realm_key.clone(),
        realm_label: phrases::realm_label(&state.realm_key).to_owned(),
        spread: state.spread.clone(),
        realm_end_reading: state.realm_end_reading.clone(),
        log: state.log.clone(),
        choices: session
            .choices()
            .iter()
            .map(|c| ChoiceView {
                index: c.index,
                text: c.text.clone(),
            })
            .collect(),
        awaiting_name: session.awaiting_name(),
        ended: session.ended(),
        prompt_id: state.prompt_id.clone(),
        prompt_title: state.prompt_title.clone(),
        stats: session.stats(),
        gate_hint: phrases::gate_hint(state.top_signal().as_deref()).to_owned(),
        cloud,
    }
}

fn cloud_state(state: &AppState) -> Option<CloudState> {
    state.cloud.as_ref().map(|c| c.sync.state())
}

/// GET /state
async fn current_state(State(state): State<AppState>) -> Json<TrialView> {
    let session = state.session.lock().await;
    Json(view_of(&session, cloud_state(&state)))
}

/// GET /export.json
///
/// The raw accumulated payload as a downloadable document: the same shape
/// autosave writes locally and the cloud row holds.
async fn export_payload(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let session = state.session.lock().await;
    let payload = session.build_payload()?;
    Ok((
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"seer_payload.json\"",
        )],
        Json(payload),
    ))
}

/// POST /boot
#[instrument(skip(state))]
async fn boot(State(state): State<AppState>) -> Result<Json<TrialView>, ApiError> {
    let payload = {
        let mut session = state.session.lock().await;
        session.boot()?
    };
    state.push_cloud(&payload).await;
    let session = state.session.lock().await;
    Ok(Json(view_of(&session, cloud_state(&state))))
}

/// POST /advance
#[instrument(skip(state))]
async fn advance(State(state): State<AppState>) -> Result<Json<TrialView>, ApiError> {
    let payload = {
        let mut session = state.session.lock().await;
        session.advance()?
    };
    state.push_cloud(&payload).await;
    let session = state.session.lock().await;
    Ok(Json(view_of(&session, cloud_state(&state))))
}

/// Request body for POST /choice.
#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    /// Index of the chosen option.
    pub index: usize,
    /// Whisper note captured alongside the choice.
    #[serde(default)]
    pub note: String,
}

/// POST /choice
#[instrument(skip(state, request), fields(index = request.index))]
async fn choice(
    State(state): State<AppState>,
    Json(request): Json<ChoiceRequest>,
) -> Result<Json<TrialView>, ApiError> {
    info!("committing choice");
    let payload = {
        let mut session = state.session.lock().await;
        session.commit_choice(request.index, &request.note)?
    };
    state.push_cloud(&payload).await;
    let session = state.session.lock().await;
    Ok(Json(view_of(&session, cloud_state(&state))))
}

/// Request body for POST /name.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    /// The player's name.
    pub name: String,
}

/// POST /name
#[instrument(skip_all)]
async fn provide_name(
    State(state): State<AppState>,
    Json(request): Json<NameRequest>,
) -> Result<Json<TrialView>, ApiError> {
    let payload = {
        let mut session = state.session.lock().await;
        session.provide_name(&request.name)?
    };
    state.push_cloud(&payload).await;
    let session = state.session.lock().await;
    Ok(Json(view_of(&session, cloud_state(&state))))
}

/// POST /new
#[instrument(skip(state))]
async fn new_trial(State(state): State<AppState>) -> Result<Json<TrialView>, ApiError> {
    info!("beginning new trial");
    let payload = {
        let mut session = state.session.lock().await;
        session.new_trial()?
    };
    state.push_cloud(&payload).await;
    let session = state.session.lock().await;
    Ok(Json(view_of(&session, cloud_state(&state))))
}

/// POST /reset
#[instrument(skip(state))]
async fn reset_all(State(state): State<AppState>) -> Result<Json<TrialView>, ApiError> {
    info!("resetting all persistent state");
    let payload = {
        let mut session = state.session.lock().await;
        session.reset_all()?
    };
    state.push_cloud(&payload).await;
    let session = state.session.lock().await;
    Ok(Json(view_of(&session, cloud_state(&state))))
}

/// Returns the router for the trial surface.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/state", get(current_state))
        .route("/export.json", get(export_payload))
        .route("/boot", post(boot))
        .route("/advance", post(advance))
        .route("/choice", post(choice))
        .route("/name", post(provide_name))
        .route("/new", post(new_trial))
        .route("/reset", post(reset_all))
}
