//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `estados_*` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database status ID, `None` for unknown IDs.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Machine name as stored in the lookup table's `name` column.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

define_status_enum! {
    /// Project lifecycle status.
    ProjectStatus {
        Draft = 1 => "draft",
        InProgress = 2 => "in_progress",
        Active = 3 => "active",
        Completed = 4 => "completed",
        Cancelled = 5 => "cancelled",
    }
}

define_status_enum! {
    /// Deliverable review status. Transitions live in [`crate::deliverable`].
    DeliverableStatus {
        Pending = 1 => "pending",
        Submitted = 2 => "submitted",
        UnderReview = 3 => "under_review",
        Accepted = 4 => "accepted",
        Rejected = 5 => "rejected",
        ChangesRequested = 6 => "changes_requested",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_status_ids_match_seed_order() {
        assert_eq!(ProjectStatus::Draft.id(), 1);
        assert_eq!(ProjectStatus::Cancelled.id(), 5);
        assert_eq!(ProjectStatus::from_id(3), Some(ProjectStatus::Active));
        assert_eq!(ProjectStatus::from_id(0), None);
    }

    #[test]
    fn deliverable_status_displays_machine_name() {
        assert_eq!(DeliverableStatus::ChangesRequested.to_string(), "changes_requested");
        assert_eq!(DeliverableStatus::UnderReview.name(), "under_review");
        assert_eq!(DeliverableStatus::from_id(7), None);
    }
}
