//! Handlers for the `/projects` resource.
//!
//! Reads require `View`, edits require `Contribute`; both are decided by the
//! access resolver against the project's area, owners and roster.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gestion_core::access::{check_join_area, AccessAction, AccessDecision};
use gestion_core::error::CoreError;
use gestion_core::membership::ProjectRole;
use gestion_core::roles::Role;
use gestion_core::status::{ProjectStatus, StatusId};
use gestion_core::types::DbId;
use gestion_db::access::AccessRepo;
use gestion_db::models::project::{AssignProject, CreateProject, Project, UpdateProject};
use gestion_db::repositories::{ProjectRepo, UserRepo};
use serde::{Deserialize, Serialize};

use super::{optional_text, required_text, validate_work_area};
use crate::access::{authorize_project, decide, find_project, load_subject};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /projects`.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: Option<String>,
    pub status_id: Option<StatusId>,
    /// Defaults to the creator's effective work area.
    pub work_area_id: Option<DbId>,
}

/// Request body for `PUT /projects/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status_id: Option<StatusId>,
}

/// Query string for `GET /projects/{id}/access`.
#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    #[serde(default)]
    pub action: AccessAction,
}

/// Response body for `GET /projects/{id}/access`.
#[derive(Debug, Serialize)]
pub struct AccessCheck {
    pub project_id: DbId,
    pub action: AccessAction,
    #[serde(flatten)]
    pub decision: AccessDecision,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/projects
///
/// Projects the caller may `View`. Rosters are loaded in one query.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let subject = load_subject(&state, &auth_user).await?;
    let projects = ProjectRepo::list(&state.pool).await?;
    let targets = AccessRepo::project_targets(&state.pool, &projects).await?;

    let visible: Vec<Project> = projects
        .into_iter()
        .filter(|p| {
            targets
                .get(&p.id)
                .is_some_and(|t| decide(&state, &subject, t, AccessAction::View).granted)
        })
        .collect();

    Ok(Json(DataResponse { data: visible }))
}

/// POST /api/v1/projects
///
/// The creator becomes an active member and, when they are a student or a
/// director, the project's owning student or director.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let title = required_text("title", &input.title)?;
    let status_id = input.status_id.map(validate_status).transpose()?;
    let subject = load_subject(&state, &auth_user).await?;

    let work_area_id = input
        .work_area_id
        .or_else(|| subject.effective_area(state.config.access_policy));
    if let Some(area_id) = input.work_area_id {
        validate_work_area(&state, area_id).await?;
    }
    check_join_area(&subject, work_area_id, state.config.access_policy)
        .map_err(AppError::access_denied)?;

    let create = CreateProject {
        title,
        description: input.description,
        status_id,
        student_id: (subject.role == Role::Student).then_some(subject.user_id),
        director_id: (subject.role == Role::Director).then_some(subject.user_id),
        work_area_id,
        created_by: Some(subject.user_id),
    };

    let project = ProjectRepo::create_with_creator(
        &state.pool,
        &create,
        subject.user_id,
        ProjectRole::default_for(subject.role),
    )
    .await?;

    tracing::info!(
        project_id = project.id,
        user_id = subject.user_id,
        work_area_id = ?project.work_area_id,
        "Project created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let access = authorize_project(&state, &auth_user, id, AccessAction::View).await?;
    Ok(Json(DataResponse {
        data: access.project,
    }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjectRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    authorize_project(&state, &auth_user, id, AccessAction::Contribute).await?;

    let update = UpdateProject {
        title: optional_text("title", input.title)?,
        description: input.description,
        status_id: input.status_id.map(validate_status).transpose()?,
    };

    let project = ProjectRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(project_id = id, user_id = auth_user.user_id, "Project updated");
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}/assignment
///
/// Set the owning student, the director and/or the work area. Restricted to
/// administrators and directors with `Contribute` access to the project.
pub async fn assign(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AssignProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    let access = authorize_project(&state, &auth_user, id, AccessAction::Contribute).await?;
    if !access.subject.role.can_assign_projects() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only administrators and directors can assign projects".into(),
        )));
    }

    if let Some(student_id) = input.student_id {
        require_user_with_role(&state, student_id, Role::Student).await?;
    }
    if let Some(director_id) = input.director_id {
        require_user_with_role(&state, director_id, Role::Director).await?;
    }
    if let Some(area_id) = input.work_area_id {
        validate_work_area(&state, area_id).await?;
        check_join_area(&access.subject, Some(area_id), state.config.access_policy)
            .map_err(AppError::access_denied)?;
    }

    let project = ProjectRepo::assign(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(
        project_id = id,
        student_id = ?input.student_id,
        director_id = ?input.director_id,
        work_area_id = ?input.work_area_id,
        assigned_by = auth_user.user_id,
        "Project assignment changed"
    );
    Ok(Json(DataResponse { data: project }))
}

/// GET /api/v1/projects/{id}/access?action=view|contribute|review
///
/// Explain the resolver's decision for the caller without enforcing it.
pub async fn check_access(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Query(query): Query<AccessQuery>,
) -> AppResult<Json<DataResponse<AccessCheck>>> {
    let project = find_project(&state, id).await?;
    let subject = load_subject(&state, &auth_user).await?;
    let target = AccessRepo::project_target(&state.pool, &project).await?;
    let decision = decide(&state, &subject, &target, query.action);

    Ok(Json(DataResponse {
        data: AccessCheck {
            project_id: id,
            action: query.action,
            decision,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_status(status_id: StatusId) -> AppResult<StatusId> {
    ProjectStatus::from_id(status_id)
        .map(ProjectStatus::id)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown project status_id {status_id}"
            )))
        })
}

async fn require_user_with_role(state: &AppState, user_id: DbId, role: Role) -> AppResult<()> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "User {user_id} does not exist or is inactive"
            )))
        })?;
    if user.role_id != role.id() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "User {user_id} is not a {role}"
        ))));
    }
    Ok(())
}
