//! Project membership model (`proyecto_usuarios`) and DTOs.

use gestion_core::access::RosterEntry;
use gestion_core::error::CoreError;
use gestion_core::membership::{MemberStatus, ProjectRole};
use gestion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A membership row binding a user to a project.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectMember {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub role_in_project: String,
    pub status: String,
    pub joined_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectMember {
    /// Convert to the resolver's roster form.
    ///
    /// Fails only if the row holds a value the CHECK constraints should have rejected.
    pub fn roster_entry(&self) -> Result<RosterEntry, CoreError> {
        Ok(RosterEntry {
            user_id: self.user_id,
            role_in_project: ProjectRole::parse(&self.role_in_project)
                .map_err(|e| CoreError::Internal(e.to_string()))?,
            status: MemberStatus::parse(&self.status)
                .map_err(|e| CoreError::Internal(e.to_string()))?,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active.as_str()
    }
}

/// Roster row joined with the member's user record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectMemberDetail {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub user_name: String,
    pub user_email: String,
    pub role_in_project: String,
    pub status: String,
    pub joined_at: Timestamp,
}

/// DTO for adding or updating a membership.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertMember {
    pub role_in_project: ProjectRole,
    /// Defaults to active.
    pub status: Option<MemberStatus>,
}
