//! Route definitions for the `/projects` resource.
//!
//! Also nests members, invitations and deliverables under
//! `/projects/{id}/...`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{deliverable, invitation, member, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                   -> list
/// POST   /                                   -> create
/// GET    /{id}                               -> get_by_id
/// PUT    /{id}                               -> update
/// PUT    /{id}/assignment                    -> assign
/// GET    /{id}/access                        -> check_access
///
/// GET    /{id}/members                       -> member::list
///
/// GET    /{id}/invitations                   -> invitation::list
/// POST   /{id}/invitations                   -> invitation::create
/// DELETE /{id}/invitations/{invitation_id}   -> invitation::revoke
/// POST   /invitations/accept/{code}          -> invitation::accept
///
/// GET    /{id}/deliverables                  -> deliverable::list
/// POST   /{id}/deliverables                  -> deliverable::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/{id}", get(project::get_by_id).put(project::update))
        .route("/{id}/assignment", put(project::assign))
        .route("/{id}/access", get(project::check_access))
        .route("/{id}/members", get(member::list))
        .route(
            "/{id}/invitations",
            get(invitation::list).post(invitation::create),
        )
        .route(
            "/{id}/invitations/{invitation_id}",
            delete(invitation::revoke),
        )
        .route("/invitations/accept/{code}", post(invitation::accept))
        .route(
            "/{id}/deliverables",
            get(deliverable::list).post(deliverable::create),
        )
}
