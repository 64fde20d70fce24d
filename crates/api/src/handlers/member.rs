//! Handlers for a project's membership roster.

use axum::extract::{Path, State};
use axum::Json;
use gestion_core::access::AccessAction;
use gestion_core::types::DbId;
use gestion_db::models::project_member::ProjectMemberDetail;
use gestion_db::repositories::ProjectMemberRepo;

use crate::access::authorize_project;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{id}/members
///
/// Active and inactive memberships, oldest first.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProjectMemberDetail>>>> {
    authorize_project(&state, &auth_user, project_id, AccessAction::View).await?;
    let members = ProjectMemberRepo::list_details(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: members }))
}
