//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod deliverable_repo;
pub mod invitation_repo;
pub mod project_member_repo;
pub mod project_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;
pub mod work_area_repo;

pub use deliverable_repo::DeliverableRepo;
pub use invitation_repo::InvitationRepo;
pub use project_member_repo::ProjectMemberRepo;
pub use project_repo::ProjectRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use work_area_repo::WorkAreaRepo;
