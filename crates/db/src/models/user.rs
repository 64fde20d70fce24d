//! User entity model and DTOs.

use chrono::NaiveDate;
use gestion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `usuarios` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub work_area_id: Option<DbId>,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    /// Resolved role name (e.g. `"administrator"`, `"student"`).
    pub role: String,
    pub role_id: DbId,
    pub work_area_id: Option<DbId>,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl UserResponse {
    /// Build a response from a row and its pre-resolved role name.
    pub fn from_user(user: &User, role: String) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role,
            role_id: user.role_id,
            work_area_id: user.work_area_id,
            bio: user.bio.clone(),
            birth_date: user.birth_date,
            phone: user.phone.clone(),
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub work_area_id: Option<DbId>,
}

/// DTO for admin updates. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<DbId>,
    pub work_area_id: Option<DbId>,
    pub is_active: Option<bool>,
}

/// DTO for a user editing their own profile. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
}
