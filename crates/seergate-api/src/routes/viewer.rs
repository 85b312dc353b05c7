//! Viewer context endpoint.

use axum::extract::Query;
use axum::{Json, Router, routing::get};

use crate::state::AppState;
use crate::viewer::{ViewerContext, ViewerParams};

/// GET /context
///
/// Resolves share-link query parameters into the context a client should
/// render under.
async fn context(Query(params): Query<ViewerParams>) -> Json<ViewerContext> {
    Json(ViewerContext::resolve(&params))
}

/// Returns the viewer-context router.
pub fn router() -> Router<AppState> {
    Router::new().route("/context", get(context))
}
