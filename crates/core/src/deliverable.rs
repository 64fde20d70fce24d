//! Deliverable lifecycle rules.
//!
//! ```text
//! pending ──submit──> submitted ──start review──> under_review ──> accepted
//!                       ^   |                         |  |
//!                       |   └── re-upload ──┘         |  └──> rejected ───────┐
//!                       |                             └──> changes_requested ─┤
//!                       └──────────────── resubmit ───────────────────────────┘
//! ```

use serde::Deserialize;

use crate::error::CoreError;
use crate::status::DeliverableStatus;
use crate::types::DbId;

/// Maximum stored length of a file reference.
pub const MAX_FILE_REFERENCE_LEN: usize = 1024;

/// Reviewer verdicts accepted by the review endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewVerdict {
    StartReview,
    Accept,
    Reject,
    RequestChanges,
}

impl ReviewVerdict {
    pub fn target_status(self) -> DeliverableStatus {
        match self {
            ReviewVerdict::StartReview => DeliverableStatus::UnderReview,
            ReviewVerdict::Accept => DeliverableStatus::Accepted,
            ReviewVerdict::Reject => DeliverableStatus::Rejected,
            ReviewVerdict::RequestChanges => DeliverableStatus::ChangesRequested,
        }
    }

    /// Rejections and change requests must tell the student why.
    pub fn requires_feedback(self) -> bool {
        matches!(self, ReviewVerdict::Reject | ReviewVerdict::RequestChanges)
    }
}

/// Whether `from -> to` is an allowed transition.
pub fn can_transition(from: DeliverableStatus, to: DeliverableStatus) -> bool {
    use DeliverableStatus::*;
    matches!(
        (from, to),
        (Pending, Submitted)
            | (Submitted, Submitted)
            | (Submitted, UnderReview)
            | (UnderReview, Accepted)
            | (UnderReview, Rejected)
            | (UnderReview, ChangesRequested)
            | (ChangesRequested, Submitted)
            | (Rejected, Submitted)
    )
}

pub fn validate_transition(
    from: DeliverableStatus,
    to: DeliverableStatus,
) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move deliverable from '{from}' to '{to}'"
        )))
    }
}

/// Validate a file reference supplied on submission.
pub fn validate_file_reference(reference: &str) -> Result<(), CoreError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "submitted_file must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_FILE_REFERENCE_LEN {
        return Err(CoreError::Validation(format!(
            "submitted_file must be at most {MAX_FILE_REFERENCE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate reviewer feedback for a verdict.
pub fn validate_review(verdict: ReviewVerdict, feedback: Option<&str>) -> Result<(), CoreError> {
    let has_feedback = feedback.is_some_and(|f| !f.trim().is_empty());
    if verdict.requires_feedback() && !has_feedback {
        return Err(CoreError::Validation(
            "feedback is required when rejecting or requesting changes".to_string(),
        ));
    }
    Ok(())
}

/// Reject a reviewer who is the deliverable's assignee or who made its
/// latest submission.
pub fn check_independent_reviewer(
    reviewer_id: DbId,
    assignee_id: Option<DbId>,
    last_submitter: Option<DbId>,
) -> Result<(), CoreError> {
    if assignee_id == Some(reviewer_id) || last_submitter == Some(reviewer_id) {
        return Err(CoreError::Forbidden(
            "Reviewers cannot review their own deliverable".to_string(),
        ));
    }
    Ok(())
}
