pub mod admin;
pub mod auth;
pub mod deliverable;
pub mod invitation;
pub mod member;
pub mod profile;
pub mod project;
pub mod role;
pub mod work_area;

use gestion_core::error::CoreError;
use gestion_core::types::DbId;
use gestion_db::repositories::WorkAreaRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Maximum length of short free-text fields (names, titles, phases).
const MAX_NAME_LEN: usize = 255;

/// Trim a required text field and reject it if empty or too long.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} must not be empty"
        ))));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        ))));
    }
    Ok(trimmed.to_string())
}

/// Same as [`required_text`] for fields that may be omitted.
pub(crate) fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    value.map(|v| required_text(field, &v)).transpose()
}

/// Reject a `work_area_id` that does not reference an existing area.
pub(crate) async fn validate_work_area(state: &AppState, area_id: DbId) -> AppResult<()> {
    WorkAreaRepo::find_by_id(&state.pool, area_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown work_area_id {area_id}"
            )))
        })
}
