//! Domain logic for the academic project-management backend.
//!
//! This crate has no I/O: the database and HTTP layers fetch rows and hand
//! them to the functions here for decisions and validation.

pub mod access;
pub mod deliverable;
pub mod error;
pub mod invitation;
pub mod membership;
pub mod roles;
pub mod status;
pub mod types;
