//! Handlers for project invitations.
//!
//! Coordinators and directors of a project (and administrators) create,
//! list and revoke codes. Any active user may accept a code, subject to the
//! same area rule that governs project creation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use gestion_core::access::{can_manage_invitations, check_join_area, AccessAction};
use gestion_core::error::CoreError;
use gestion_core::invitation::{
    expiry_from, generate_code, validate_max_uses, DEFAULT_MAX_USES,
};
use gestion_core::membership::ProjectRole;
use gestion_core::types::DbId;
use gestion_db::models::invitation::{AcceptOutcome, CreateInvitation, Invitation};
use gestion_db::models::project_member::ProjectMember;
use gestion_db::repositories::InvitationRepo;
use serde::{Deserialize, Serialize};

use crate::access::{authorize_project, find_project, load_subject, ProjectAccess};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Attempts at drawing an unused code before giving up.
const CODE_ATTEMPTS: usize = 3;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /projects/{id}/invitations`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateInvitationRequest {
    /// Defaults to `student`.
    pub role_in_project: Option<ProjectRole>,
    pub max_uses: Option<i32>,
    pub expires_in_days: Option<i64>,
}

/// Response body for a successful acceptance.
#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub member: ProjectMember,
    pub already_member: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/invitations
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Invitation>>>> {
    authorize_manager(&state, &auth_user, project_id).await?;
    let invitations = InvitationRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: invitations }))
}

/// POST /api/v1/projects/{id}/invitations
///
/// Returns 201 with the new invitation, including its code.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateInvitationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Invitation>>)> {
    authorize_manager(&state, &auth_user, project_id).await?;

    let max_uses = input.max_uses.unwrap_or(DEFAULT_MAX_USES);
    validate_max_uses(max_uses)?;
    let expires_at = expiry_from(Utc::now(), input.expires_in_days)?;
    let role_in_project = input.role_in_project.unwrap_or(ProjectRole::Student);

    let mut attempt = 0;
    let invitation = loop {
        attempt += 1;
        let create = CreateInvitation {
            project_id,
            code: generate_code(),
            role_in_project,
            max_uses,
            expires_at,
            created_by: auth_user.user_id,
        };
        match InvitationRepo::create(&state.pool, &create).await {
            Ok(invitation) => break invitation,
            Err(err)
                if attempt < CODE_ATTEMPTS && is_unique_violation(&err, "uq_invitaciones_code") =>
            {
                tracing::debug!(project_id, attempt, "Invitation code collision, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    };

    tracing::info!(
        invitation_id = invitation.id,
        project_id,
        role = %role_in_project,
        max_uses,
        created_by = auth_user.user_id,
        "Invitation created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: invitation })))
}

/// DELETE /api/v1/projects/{id}/invitations/{invitation_id}
pub async fn revoke(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((project_id, invitation_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_manager(&state, &auth_user, project_id).await?;

    if InvitationRepo::revoke(&state.pool, project_id, invitation_id).await? {
        tracing::info!(
            invitation_id,
            project_id,
            revoked_by = auth_user.user_id,
            "Invitation revoked"
        );
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "No active invitation {invitation_id} in project {project_id}"
        )))
    }
}

/// POST /api/v1/projects/invitations/accept/{code}
///
/// 201 when a membership was created or reactivated, 200 when the caller
/// was already an active member. Revoked or expired codes give 410, used-up
/// codes 409. The area rule applies only to users who are not yet members.
pub async fn accept(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(code): Path<String>,
) -> AppResult<(StatusCode, Json<DataResponse<AcceptResponse>>)> {
    let subject = load_subject(&state, &auth_user).await?;
    let not_found = || AppError::NotFound("Invitation code not found".into());

    let invitation = InvitationRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(not_found)?;
    let project = find_project(&state, invitation.project_id).await?;
    let policy = state.config.access_policy;

    let outcome = InvitationRepo::accept(&state.pool, &code, subject.user_id, |_| {
        check_join_area(&subject, project.work_area_id, policy).map_err(CoreError::from)
    })
    .await?
    .ok_or_else(not_found)?;

    let (status, already_member) = match &outcome {
        AcceptOutcome::Joined(_) => (StatusCode::CREATED, false),
        AcceptOutcome::AlreadyMember(_) => (StatusCode::OK, true),
    };
    Ok((
        status,
        Json(DataResponse {
            data: AcceptResponse {
                member: outcome.member().clone(),
                already_member,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Require `Contribute` access plus a role that may manage invitations.
async fn authorize_manager(
    state: &AppState,
    auth_user: &AuthUser,
    project_id: DbId,
) -> AppResult<ProjectAccess> {
    let access = authorize_project(state, auth_user, project_id, AccessAction::Contribute).await?;
    if !can_manage_invitations(&access.subject, &access.target) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only project coordinators and directors can manage invitations".into(),
        )));
    }
    Ok(access)
}
