//! Project-scoped roles and membership status (`proyecto_usuarios`).
//!
//! Both are stored as TEXT columns guarded by CHECK constraints, so the
//! string forms here must stay in sync with the migration.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;

pub const MEMBER_STATUS_ACTIVE: &str = "active";
pub const MEMBER_STATUS_INACTIVE: &str = "inactive";

/// Role a user holds inside one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    Coordinator,
    Director,
    Evaluator,
    Student,
}

impl ProjectRole {
    pub const ALL: [ProjectRole; 4] = [
        ProjectRole::Coordinator,
        ProjectRole::Director,
        ProjectRole::Evaluator,
        ProjectRole::Student,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectRole::Coordinator => "coordinator",
            ProjectRole::Director => "director",
            ProjectRole::Evaluator => "evaluator",
            ProjectRole::Student => "student",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid project role '{value}'. Must be one of: coordinator, director, evaluator, student"
                ))
            })
    }

    /// Default project role for a user joining with the given global role.
    ///
    /// Administrators have no natural project role; they join as coordinators.
    pub fn default_for(role: Role) -> Self {
        match role {
            Role::Administrator | Role::Coordinator => ProjectRole::Coordinator,
            Role::Director => ProjectRole::Director,
            Role::Evaluator => ProjectRole::Evaluator,
            Role::Student => ProjectRole::Student,
        }
    }

    /// Whether this member may manage the project's invitations.
    pub fn manages_invitations(self) -> bool {
        matches!(self, ProjectRole::Coordinator | ProjectRole::Director)
    }
}

impl std::fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a membership row currently counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberStatus::Active => MEMBER_STATUS_ACTIVE,
            MemberStatus::Inactive => MEMBER_STATUS_INACTIVE,
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            MEMBER_STATUS_ACTIVE => Ok(MemberStatus::Active),
            MEMBER_STATUS_INACTIVE => Ok(MemberStatus::Inactive),
            other => Err(CoreError::Validation(format!(
                "Invalid membership status '{other}'. Must be one of: active, inactive"
            ))),
        }
    }
}
