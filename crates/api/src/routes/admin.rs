//! Route definitions for the `/admin` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler requires the administrator role.
///
/// ```text
/// GET    /users                                -> list_users
/// POST   /users                                -> create_user
/// GET    /users/{id}                           -> get_user
/// PUT    /users/{id}                           -> update_user
/// DELETE /users/{id}                           -> deactivate_user
///
/// PUT    /projects/{id}/members/{user_id}      -> upsert_member
/// DELETE /projects/{id}/members/{user_id}      -> remove_member
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::deactivate_user),
        )
        .route(
            "/projects/{id}/members/{user_id}",
            put(admin::upsert_member).delete(admin::remove_member),
        )
}
