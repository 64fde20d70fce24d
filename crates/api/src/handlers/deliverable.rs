//! Handlers for deliverables and their review cycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gestion_core::access::AccessAction;
use gestion_core::deliverable::{
    check_independent_reviewer, validate_file_reference, validate_review, ReviewVerdict,
};
use gestion_core::error::CoreError;
use gestion_core::status::DeliverableStatus;
use gestion_core::types::DbId;
use gestion_db::models::deliverable::{
    CreateDeliverable, Deliverable, DeliverableHistoryEntry, TransitionChanges,
};
use gestion_db::repositories::DeliverableRepo;
use serde::Deserialize;

use super::{optional_text, required_text};
use crate::access::{authorize_deliverable, authorize_project};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /deliverables/{id}/submit`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub submitted_file: String,
    pub note: Option<String>,
}

/// Request body for `POST /deliverables/{id}/review`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub verdict: ReviewVerdict,
    pub feedback: Option<String>,
}

/// GET /api/v1/projects/{id}/deliverables
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Deliverable>>>> {
    authorize_project(&state, &auth_user, project_id, AccessAction::View).await?;
    let deliverables = DeliverableRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: deliverables }))
}

/// POST /api/v1/projects/{id}/deliverables
///
/// The assignee, if any, must be an owner or an active member whose project
/// role may contribute.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateDeliverable>,
) -> AppResult<(StatusCode, Json<DataResponse<Deliverable>>)> {
    let access =
        authorize_project(&state, &auth_user, project_id, AccessAction::Contribute).await?;

    if let Some(assignee_id) = input.assignee_id {
        if !access.target.is_contributor(assignee_id) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "User {assignee_id} cannot contribute to project {project_id}"
            ))));
        }
    }
    if let Some(file) = input.original_file.as_deref() {
        validate_file_reference(file)?;
    }

    let create = CreateDeliverable {
        title: required_text("title", &input.title)?,
        phase: optional_text("phase", input.phase)?,
        ..input
    };
    let deliverable = DeliverableRepo::create(&state.pool, project_id, &create).await?;

    tracing::info!(
        deliverable_id = deliverable.id,
        project_id,
        created_by = auth_user.user_id,
        "Deliverable created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: deliverable })))
}

/// GET /api/v1/deliverables/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Deliverable>>> {
    let access = authorize_deliverable(&state, &auth_user, id, AccessAction::View).await?;
    Ok(Json(DataResponse {
        data: access.deliverable,
    }))
}

/// POST /api/v1/deliverables/{id}/submit
///
/// Allowed from `pending`, `changes_requested`, `rejected`, and again from
/// `submitted` to replace the file before review starts.
pub async fn submit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitRequest>,
) -> AppResult<Json<DataResponse<Deliverable>>> {
    authorize_deliverable(&state, &auth_user, id, AccessAction::Contribute).await?;
    validate_file_reference(&input.submitted_file)?;

    let changes = TransitionChanges {
        submitted_file: Some(input.submitted_file.trim().to_string()),
        feedback: None,
    };
    let deliverable = DeliverableRepo::transition(
        &state.pool,
        id,
        DeliverableStatus::Submitted,
        auth_user.user_id,
        input.note.as_deref(),
        &changes,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Deliverable",
        id,
    }))?;

    Ok(Json(DataResponse { data: deliverable }))
}

/// POST /api/v1/deliverables/{id}/review
///
/// Students never review, even on deliverables they own. Nobody reviews a
/// deliverable assigned to them or one they submitted last.
pub async fn review(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<Deliverable>>> {
    let access = authorize_deliverable(&state, &auth_user, id, AccessAction::Review).await?;
    if !access.subject.role.can_review() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Students cannot review deliverables".into(),
        )));
    }
    let last_submitter = DeliverableRepo::last_submitter(&state.pool, id).await?;
    check_independent_reviewer(
        access.subject.user_id,
        access.deliverable.assignee_id,
        last_submitter,
    )?;

    let feedback = input
        .feedback
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty());
    validate_review(input.verdict, feedback.as_deref())?;

    let changes = TransitionChanges {
        submitted_file: None,
        feedback: feedback.clone(),
    };
    let deliverable = DeliverableRepo::transition(
        &state.pool,
        id,
        input.verdict.target_status(),
        auth_user.user_id,
        feedback.as_deref(),
        &changes,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Deliverable",
        id,
    }))?;

    Ok(Json(DataResponse { data: deliverable }))
}

/// GET /api/v1/deliverables/{id}/history
pub async fn history(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<DeliverableHistoryEntry>>>> {
    authorize_deliverable(&state, &auth_user, id, AccessAction::View).await?;
    let entries = DeliverableRepo::history(&state.pool, id).await?;
    Ok(Json(DataResponse { data: entries }))
}
