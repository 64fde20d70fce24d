//! Handlers for the `/work-areas` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use gestion_db::models::work_area::{CreateWorkArea, WorkArea};
use gestion_db::repositories::WorkAreaRepo;
use serde::Deserialize;

use super::required_text;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /work-areas`.
#[derive(Debug, Deserialize)]
pub struct CreateWorkAreaRequest {
    pub name: String,
    pub description: Option<String>,
}

/// GET /api/v1/work-areas
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<WorkArea>>>> {
    let areas = WorkAreaRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: areas }))
}

/// POST /api/v1/work-areas
///
/// Duplicate names surface as 409 through the `uq_areas_trabajo_name` constraint.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateWorkAreaRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<WorkArea>>)> {
    let create = CreateWorkArea {
        name: required_text("name", &input.name)?,
        description: input.description,
    };
    let area = WorkAreaRepo::create(&state.pool, &create).await?;
    tracing::info!(work_area_id = area.id, admin_id = admin.user_id, "Work area created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: area })))
}
