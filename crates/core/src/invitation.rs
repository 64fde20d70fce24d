//! Invitation code generation and acceptance rules.
//!
//! An invitation is a short code bound to one project. It can be accepted up
//! to `max_uses` times before `expires_at`, unless it has been revoked.
//! The database layer performs acceptance inside a transaction and calls
//! [`check_acceptable`] on the locked row.

use chrono::Duration;
use rand::Rng;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Length of a generated invitation code.
pub const CODE_LENGTH: usize = 10;

/// Characters used for codes. Omits `0/O` and `1/I/L` so codes survive being read aloud.
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub const DEFAULT_EXPIRY_DAYS: i64 = 7;
pub const MAX_EXPIRY_DAYS: i64 = 90;
pub const DEFAULT_MAX_USES: i32 = 1;
pub const MAX_USES_LIMIT: i32 = 100;

/// The fields of an invitation row that decide whether it can still be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvitationState {
    pub uses: i32,
    pub max_uses: i32,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvitationError {
    #[error("Invitation has been revoked")]
    Revoked,
    #[error("Invitation has expired")]
    Expired,
    #[error("Invitation has no remaining uses")]
    Exhausted,
}

impl From<InvitationError> for CoreError {
    fn from(err: InvitationError) -> Self {
        match err {
            InvitationError::Revoked | InvitationError::Expired => {
                CoreError::Gone(err.to_string())
            }
            InvitationError::Exhausted => CoreError::Conflict(err.to_string()),
        }
    }
}

/// Generate a new random invitation code.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Normalise user input to the stored code form.
pub fn normalize_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

/// Check that an invitation can be accepted at `now`.
///
/// Revocation is reported before expiry, and expiry before exhaustion.
pub fn check_acceptable(state: &InvitationState, now: Timestamp) -> Result<(), InvitationError> {
    if state.revoked_at.is_some() {
        return Err(InvitationError::Revoked);
    }
    if state.expires_at <= now {
        return Err(InvitationError::Expired);
    }
    if state.uses >= state.max_uses {
        return Err(InvitationError::Exhausted);
    }
    Ok(())
}

/// Validate a requested `max_uses` value.
pub fn validate_max_uses(max_uses: i32) -> Result<(), CoreError> {
    if !(1..=MAX_USES_LIMIT).contains(&max_uses) {
        return Err(CoreError::Validation(format!(
            "max_uses must be between 1 and {MAX_USES_LIMIT}"
        )));
    }
    Ok(())
}

/// Compute the expiry timestamp for a new invitation.
pub fn expiry_from(now: Timestamp, expires_in_days: Option<i64>) -> Result<Timestamp, CoreError> {
    let days = expires_in_days.unwrap_or(DEFAULT_EXPIRY_DAYS);
    if !(1..=MAX_EXPIRY_DAYS).contains(&days) {
        return Err(CoreError::Validation(format!(
            "expires_in_days must be between 1 and {MAX_EXPIRY_DAYS}"
        )));
    }
    Ok(now + Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn open_state(now: Timestamp) -> InvitationState {
        InvitationState {
            uses: 0,
            max_uses: 1,
            expires_at: now + Duration::days(1),
            revoked_at: None,
        }
    }

    #[test]
    fn generated_codes_use_unambiguous_charset() {
        let code = generate_code();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_code("  ab3kq9  "), "AB3KQ9");
    }

    #[test]
    fn fresh_invitation_is_acceptable() {
        let now = Utc::now();
        assert!(check_acceptable(&open_state(now), now).is_ok());
    }

    #[test]
    fn expiry_is_exclusive() {
        let now = Utc::now();
        let mut state = open_state(now);
        state.expires_at = now;
        assert_eq!(check_acceptable(&state, now), Err(InvitationError::Expired));
    }

    #[test]
    fn used_up_invitation_is_exhausted() {
        let now = Utc::now();
        let mut state = open_state(now);
        state.uses = 1;
        assert_eq!(check_acceptable(&state, now), Err(InvitationError::Exhausted));
    }

    #[test]
    fn revocation_is_reported_first() {
        let now = Utc::now();
        let state = InvitationState {
            uses: 5,
            max_uses: 1,
            expires_at: now - Duration::days(1),
            revoked_at: Some(now),
        };
        assert_eq!(check_acceptable(&state, now), Err(InvitationError::Revoked));
    }

    #[test]
    fn errors_map_to_core_errors() {
        assert_matches!(CoreError::from(InvitationError::Expired), CoreError::Gone(_));
        assert_matches!(CoreError::from(InvitationError::Revoked), CoreError::Gone(_));
        assert_matches!(
            CoreError::from(InvitationError::Exhausted),
            CoreError::Conflict(_)
        );
    }

    #[test]
    fn max_uses_bounds() {
        assert!(validate_max_uses(1).is_ok());
        assert!(validate_max_uses(MAX_USES_LIMIT).is_ok());
        assert_matches!(validate_max_uses(0), Err(CoreError::Validation(_)));
        assert_matches!(validate_max_uses(101), Err(CoreError::Validation(_)));
    }

    #[test]
    fn expiry_defaults_to_a_week() {
        let now = Utc::now();
        assert_eq!(expiry_from(now, None).unwrap(), now + Duration::days(7));
        assert_matches!(expiry_from(now, Some(0)), Err(CoreError::Validation(_)));
        assert_matches!(expiry_from(now, Some(91)), Err(CoreError::Validation(_)));
    }
}
