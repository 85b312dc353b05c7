//! Seergate — HTTP API.
//!
//! Route construction lives here so the binary and the integration tests
//! serve the identical surface.

use axum::Router;

pub mod error;
pub mod routes;
pub mod state;
pub mod viewer;

/// Builds the full application router over the given state.
#[must_use]
pub fn app(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/trial", routes::trial::router())
        .nest("/api/v1/reading", routes::reading::router())
        .nest("/api/v1/codex", routes::codex::router())
        .nest("/api/v1/sessions", routes::session::router())
        .nest("/api/v1/viewer", routes::viewer::router())
        .with_state(state)
}
