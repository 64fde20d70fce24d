//! Project entity model and DTOs.

use gestion_core::status::StatusId;
use gestion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `proyectos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status_id: StatusId,
    /// Owning student.
    pub student_id: Option<DbId>,
    pub director_id: Option<DbId>,
    pub work_area_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to 1 (Draft) if omitted.
    pub status_id: Option<StatusId>,
    pub student_id: Option<DbId>,
    pub director_id: Option<DbId>,
    pub work_area_id: Option<DbId>,
    pub created_by: Option<DbId>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status_id: Option<StatusId>,
}

/// DTO for reassigning a project's owners or work area. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignProject {
    pub student_id: Option<DbId>,
    pub director_id: Option<DbId>,
    pub work_area_id: Option<DbId>,
}
