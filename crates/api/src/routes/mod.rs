pub mod admin;
pub mod auth;
pub mod deliverable;
pub mod health;
pub mod project;

use axum::routing::{get, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user
///
/// /student/profile/update                          update own profile (PUT)
///
/// /work-areas                                      list, create (admin)
/// /roles                                           list
///
/// /admin/users                                     list, create (admin only)
/// /admin/users/{id}                                get, update, deactivate
/// /admin/projects/{id}/members/{user_id}           upsert, remove membership
///
/// /projects                                        list visible, create
/// /projects/{id}                                   get, update
/// /projects/{id}/assignment                        set owners / area (PUT)
/// /projects/{id}/access                            explain access decision
/// /projects/{id}/members                           roster
/// /projects/{id}/invitations                       list, create
/// /projects/{id}/invitations/{invitation_id}       revoke
/// /projects/invitations/accept/{code}              accept (POST)
/// /projects/{id}/deliverables                      list, create
///
/// /deliverables/{id}                               get
/// /deliverables/{id}/submit                        submit (POST)
/// /deliverables/{id}/review                        review verdict (POST)
/// /deliverables/{id}/history                       status history
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .route(
            "/student/profile/update",
            put(handlers::profile::update_profile),
        )
        .route(
            "/work-areas",
            get(handlers::work_area::list).post(handlers::work_area::create),
        )
        .route("/roles", get(handlers::role::list))
        .nest("/admin", admin::router())
        .nest("/projects", project::router())
        .nest("/deliverables", deliverable::router())
}
