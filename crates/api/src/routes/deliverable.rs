//! Route definitions for the `/deliverables` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::deliverable;
use crate::state::AppState;

/// Routes mounted at `/deliverables`.
///
/// ```text
/// GET  /{id}          -> get_by_id
/// POST /{id}/submit   -> submit
/// POST /{id}/review   -> review
/// GET  /{id}/history  -> history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(deliverable::get_by_id))
        .route("/{id}/submit", post(deliverable::submit))
        .route("/{id}/review", post(deliverable::review))
        .route("/{id}/history", get(deliverable::history))
}
