//! Domain model structs and DTOs.
//!
//! Each submodule holds a `FromRow` entity struct matching its table's row
//! plus the input DTOs its repository accepts. Only users and projects have
//! update DTOs; roles are read-only.

pub mod deliverable;
pub mod invitation;
pub mod project;
pub mod project_member;
pub mod role;
pub mod session;
pub mod user;
pub mod work_area;
