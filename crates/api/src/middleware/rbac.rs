//! Role-based access control extractors.
//!
//! Project- and deliverable-level checks go through the access resolver
//! (see [`crate::access`]); these extractors only gate catalog-wide admin
//! routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gestion_core::error::CoreError;

use super::auth::AuthUser;
use crate::access::load_subject;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `administrator` role as currently stored for the user, not
/// the role baked into the token. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let subject = load_subject(state, &user).await?;
        if !subject.role.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Administrator role required".into(),
            )));
        }
        Ok(RequireAdmin(AuthUser {
            role: subject.role,
            ..user
        }))
    }
}
