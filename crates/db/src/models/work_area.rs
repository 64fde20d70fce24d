//! Work area entity model and DTOs.

use gestion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `areas_trabajo` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkArea {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkArea {
    pub name: String,
    pub description: Option<String>,
}
