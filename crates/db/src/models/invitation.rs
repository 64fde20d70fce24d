//! Invitation entity model (`invitaciones`) and DTOs.

use gestion_core::invitation::InvitationState;
use gestion_core::membership::ProjectRole;
use gestion_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::project_member::ProjectMember;

/// An invitation row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invitation {
    pub id: DbId,
    pub project_id: DbId,
    pub code: String,
    pub role_in_project: String,
    pub max_uses: i32,
    pub uses: i32,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub last_accepted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Invitation {
    pub fn state(&self) -> InvitationState {
        InvitationState {
            uses: self.uses,
            max_uses: self.max_uses,
            expires_at: self.expires_at,
            revoked_at: self.revoked_at,
        }
    }
}

/// DTO for inserting an invitation. The code and expiry are computed by the caller.
#[derive(Debug, Clone)]
pub struct CreateInvitation {
    pub project_id: DbId,
    pub code: String,
    pub role_in_project: ProjectRole,
    pub max_uses: i32,
    pub expires_at: Timestamp,
    pub created_by: DbId,
}

/// Result of accepting an invitation code.
#[derive(Debug, Clone)]
pub enum AcceptOutcome {
    /// A membership was created or reactivated and one use was consumed.
    Joined(ProjectMember),
    /// The user was already an active member; nothing changed.
    AlreadyMember(ProjectMember),
}

impl AcceptOutcome {
    pub fn member(&self) -> &ProjectMember {
        match self {
            AcceptOutcome::Joined(m) | AcceptOutcome::AlreadyMember(m) => m,
        }
    }
}
