//! Handler for a user editing their own profile.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use gestion_core::error::CoreError;
use gestion_db::models::user::{UpdateProfile, UserResponse};
use gestion_db::repositories::UserRepo;
use serde::Deserialize;

use super::auth::user_response;
use super::optional_text;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const MAX_BIO_LEN: usize = 2000;
const MAX_PHONE_LEN: usize = 32;

/// Request body for `PUT /student/profile/update`. Omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub phone: Option<String>,
}

/// PUT /api/v1/student/profile/update
///
/// Any authenticated user may edit their own name, bio, birth date and phone.
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    if input
        .bio
        .as_deref()
        .is_some_and(|b| b.chars().count() > MAX_BIO_LEN)
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "bio must be at most {MAX_BIO_LEN} characters"
        ))));
    }
    if input
        .phone
        .as_deref()
        .is_some_and(|p| p.trim().chars().count() > MAX_PHONE_LEN)
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "phone must be at most {MAX_PHONE_LEN} characters"
        ))));
    }
    if input.birth_date.is_some_and(|d| d > Utc::now().date_naive()) {
        return Err(AppError::Core(CoreError::Validation(
            "birth_date must not be in the future".into(),
        )));
    }

    let update = UpdateProfile {
        name: optional_text("name", input.name)?,
        bio: input.bio,
        birth_date: input.birth_date,
        phone: input.phone.map(|p| p.trim().to_string()),
    };

    let user = UserRepo::update_profile(&state.pool, auth_user.user_id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(user_response(&user)?))
}
