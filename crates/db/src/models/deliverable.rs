//! Deliverable entity model (`entregables`), its history and DTOs.

use chrono::NaiveDate;
use gestion_core::status::StatusId;
use gestion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A deliverable row from the `entregables` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Deliverable {
    pub id: DbId,
    pub project_id: DbId,
    pub phase: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status_id: StatusId,
    /// Reference to the brief or template attached when the deliverable was created.
    pub original_file: Option<String>,
    /// Reference to the student's latest submission.
    pub submitted_file: Option<String>,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<NaiveDate>,
    pub submitted_at: Option<Timestamp>,
    pub reviewed_at: Option<Timestamp>,
    pub feedback: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a deliverable.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeliverable {
    pub phase: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub original_file: Option<String>,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<NaiveDate>,
}

/// Field changes applied together with a status transition.
#[derive(Debug, Clone, Default)]
pub struct TransitionChanges {
    pub submitted_file: Option<String>,
    pub feedback: Option<String>,
}

/// A row from `historial_entregables`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeliverableHistoryEntry {
    pub id: DbId,
    pub deliverable_id: DbId,
    pub from_status_id: StatusId,
    pub to_status_id: StatusId,
    pub changed_by: Option<DbId>,
    pub note: Option<String>,
    pub created_at: Timestamp,
}
