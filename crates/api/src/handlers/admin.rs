//! Handlers for the `/admin` resource: user management and direct
//! membership edits.
//!
//! All handlers require the `administrator` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gestion_core::error::CoreError;
use gestion_core::membership::MemberStatus;
use gestion_core::roles::Role;
use gestion_core::types::DbId;
use gestion_db::models::project_member::{ProjectMember, UpsertMember};
use gestion_db::models::user::{CreateUser, UpdateUser, UserResponse};
use gestion_db::repositories::{ProjectMemberRepo, UserRepo};
use serde::Deserialize;

use super::auth::user_response;
use super::{optional_text, required_text, validate_work_area};
use crate::access::find_project;
use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: DbId,
    pub work_area_id: Option<DbId>,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<DbId>,
    pub work_area_id: Option<DbId>,
    pub is_active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
///
/// Create a new user. Returns a safe [`UserResponse`] with 201 Created.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let name = required_text("name", &input.name)?;
    let email = validate_email(&input.email)?;
    validate_role_id(input.role_id)?;
    if let Some(area_id) = input.work_area_id {
        validate_work_area(&state, area_id).await?;
    }

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name,
            email,
            password_hash: hashed,
            role_id: input.role_id,
            work_area_id: input.work_area_id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, admin_id = admin.user_id, "User created");
    Ok((StatusCode::CREATED, Json(user_response(&user)?)))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    let responses = users
        .iter()
        .map(user_response)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Json(responses))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(user_response(&user)?))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update a user's name, email, role, work area or active flag.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    if let Some(role_id) = input.role_id {
        validate_role_id(role_id)?;
    }
    if let Some(area_id) = input.work_area_id {
        validate_work_area(&state, area_id).await?;
    }
    if id == admin.user_id && input.is_active == Some(false) {
        return Err(AppError::Core(CoreError::Validation(
            "Administrators cannot deactivate themselves".into(),
        )));
    }

    let update = UpdateUser {
        name: optional_text("name", input.name)?,
        email: input.email.as_deref().map(validate_email).transpose()?,
        role_id: input.role_id,
        work_area_id: input.work_area_id,
        is_active: input.is_active,
    };

    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = user.id, admin_id = admin.user_id, "User updated");
    Ok(Json(user_response(&user)?))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate a user (sets `is_active = false`). Returns 204 No Content.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Administrators cannot deactivate themselves".into(),
        )));
    }
    if UserRepo::deactivate(&state.pool, id).await? {
        tracing::info!(user_id = id, admin_id = admin.user_id, "User deactivated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

// ---------------------------------------------------------------------------
// Memberships
// ---------------------------------------------------------------------------

/// PUT /api/v1/admin/projects/{id}/members/{user_id}
///
/// Create or update a membership with an explicit role and status.
pub async fn upsert_member(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((project_id, user_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpsertMember>,
) -> AppResult<Json<DataResponse<ProjectMember>>> {
    find_project(&state, project_id).await?;
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    let status = input.status.unwrap_or(MemberStatus::Active);
    let member = ProjectMemberRepo::upsert(
        &state.pool,
        project_id,
        user_id,
        input.role_in_project,
        status,
    )
    .await?;

    tracing::info!(
        project_id,
        user_id,
        role = %input.role_in_project,
        status = status.as_str(),
        admin_id = admin.user_id,
        "Membership set by administrator"
    );
    Ok(Json(DataResponse { data: member }))
}

/// DELETE /api/v1/admin/projects/{id}/members/{user_id}
///
/// Mark a membership inactive. The row is kept so history stays intact.
pub async fn remove_member(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((project_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if ProjectMemberRepo::deactivate(&state.pool, project_id, user_id).await? {
        tracing::info!(project_id, user_id, admin_id = admin.user_id, "Membership deactivated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "No active membership for user {user_id} in project {project_id}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::Core(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        ))));
    }
    Ok(email)
}

fn validate_role_id(role_id: DbId) -> AppResult<Role> {
    Role::from_id(role_id)
        .ok_or_else(|| AppError::Core(CoreError::Validation(format!("Unknown role_id {role_id}"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalised() {
        assert_eq!(validate_email("  Ana@Uni.EDU ").unwrap(), "ana@uni.edu");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "ana", "@uni.edu", "ana@localhost"] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn role_ids_outside_catalog_are_rejected() {
        assert_eq!(validate_role_id(5).unwrap(), Role::Student);
        assert!(validate_role_id(42).is_err());
    }
}
