//! Global role catalog.
//!
//! These must match the seed data in `20260301000002_create_roles.sql`.
//! Role ids are stable: the seed inserts them in declaration order.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

pub const ROLE_ADMINISTRATOR: &str = "administrator";
pub const ROLE_DIRECTOR: &str = "director";
pub const ROLE_COORDINATOR: &str = "coordinator";
pub const ROLE_EVALUATOR: &str = "evaluator";
pub const ROLE_STUDENT: &str = "student";

/// A user's system-wide role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Director,
    Coordinator,
    Evaluator,
    Student,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Administrator,
        Role::Director,
        Role::Coordinator,
        Role::Evaluator,
        Role::Student,
    ];

    /// Seeded primary key of this role in the `roles` table.
    pub fn id(self) -> DbId {
        match self {
            Role::Administrator => 1,
            Role::Director => 2,
            Role::Coordinator => 3,
            Role::Evaluator => 4,
            Role::Student => 5,
        }
    }

    pub fn from_id(id: DbId) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Administrator => ROLE_ADMINISTRATOR,
            Role::Director => ROLE_DIRECTOR,
            Role::Coordinator => ROLE_COORDINATOR,
            Role::Evaluator => ROLE_EVALUATOR,
            Role::Student => ROLE_STUDENT,
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Administrator
    }

    /// Roles allowed to reassign a project's student, director or work area.
    pub fn can_assign_projects(self) -> bool {
        matches!(self, Role::Administrator | Role::Director)
    }

    /// Roles allowed to evaluate deliverables. Students never review,
    /// not even on projects they own.
    pub fn can_review(self) -> bool {
        self != Role::Student
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_for_whole_catalog() {
        for role in Role::ALL {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(6), None);
    }

    #[test]
    fn only_admin_and_director_assign_projects() {
        let assigners: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|r| r.can_assign_projects())
            .collect();
        assert_eq!(assigners, vec![Role::Administrator, Role::Director]);
    }

    #[test]
    fn students_cannot_review() {
        assert!(!Role::Student.can_review());
        assert!(Role::Evaluator.can_review());
        assert!(Role::Administrator.can_review());
    }

    #[test]
    fn display_matches_catalog_name() {
        assert_eq!(Role::Coordinator.to_string(), ROLE_COORDINATOR);
    }
}
