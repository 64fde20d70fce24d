//! Role/area-scoped access resolution for projects and deliverables.
//!
//! [`resolve`] is a pure predicate over rows the caller has already fetched:
//! a [`AccessSubject`] describing the user and an [`AccessTarget`] describing
//! the resource (its work area, principal owners and membership roster).
//!
//! Decision order:
//!
//! 1. Administrators are always granted (`admin_override`).
//! 2. If the target is scoped to a work area, the subject's *effective* area
//!    must equal it, otherwise `area_mismatch`.
//! 3. Principal owners are granted (`ok`).
//! 4. Active roster members whose project role is compatible with the
//!    requested [`AccessAction`] are granted (`ok`).
//! 5. Everyone else is denied (`not_member`).
//!
//! A user without a work area has no effective area under [`AreaPolicy::Strict`].
//! Under [`AreaPolicy::InheritFromMembership`] they take the area of the
//! project behind their first active membership instead of being denied.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::membership::{MemberStatus, ProjectRole};
use crate::roles::Role;
use crate::types::DbId;

/// How a subject without a work area is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaPolicy {
    /// A NULL work area falls back to the area of the user's first active membership.
    #[default]
    InheritFromMembership,
    /// Literal equality; a NULL work area never matches a scoped target.
    Strict,
}

impl AreaPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inherit" | "inherit_from_membership" => Some(AreaPolicy::InheritFromMembership),
            "strict" => Some(AreaPolicy::Strict),
            _ => None,
        }
    }
}

/// What the subject wants to do with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    /// Read the resource.
    #[default]
    View,
    /// Modify it: edit project fields, create or submit deliverables, invite.
    Contribute,
    /// Evaluate deliverables.
    Review,
}

impl AccessAction {
    /// Whether a member holding `role` may perform this action.
    pub fn allows(self, role: ProjectRole) -> bool {
        match self {
            AccessAction::View => true,
            AccessAction::Contribute => matches!(
                role,
                ProjectRole::Student | ProjectRole::Coordinator | ProjectRole::Director
            ),
            AccessAction::Review => matches!(
                role,
                ProjectRole::Director | ProjectRole::Coordinator | ProjectRole::Evaluator
            ),
        }
    }
}

/// The user asking for access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSubject {
    pub user_id: DbId,
    pub role: Role,
    pub work_area_id: Option<DbId>,
    /// Work area of the project behind the user's earliest active membership.
    pub fallback_area_id: Option<DbId>,
}

impl AccessSubject {
    /// The area used for matching under `policy`.
    pub fn effective_area(&self, policy: AreaPolicy) -> Option<DbId> {
        match policy {
            AreaPolicy::Strict => self.work_area_id,
            AreaPolicy::InheritFromMembership => self.work_area_id.or(self.fallback_area_id),
        }
    }
}

/// One row of a resource's membership roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterEntry {
    pub user_id: DbId,
    pub role_in_project: ProjectRole,
    pub status: MemberStatus,
}

/// The project or deliverable being accessed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessTarget {
    /// `None` means the resource is not scoped to any area.
    pub work_area_id: Option<DbId>,
    /// Principal owners: the project's student and director, plus a
    /// deliverable's assignee.
    pub owners: Vec<DbId>,
    pub roster: Vec<RosterEntry>,
}

impl AccessTarget {
    /// Add a principal owner, ignoring `None` and duplicates.
    pub fn with_owner(mut self, user_id: Option<DbId>) -> Self {
        if let Some(id) = user_id {
            if !self.owners.contains(&id) {
                self.owners.push(id);
            }
        }
        self
    }

    /// Whether `user_id` is an owner or an active member whose project role
    /// may contribute. Only such users can be handed a deliverable.
    pub fn is_contributor(&self, user_id: DbId) -> bool {
        self.owners.contains(&user_id)
            || self
                .active_entry(user_id)
                .is_some_and(|e| AccessAction::Contribute.allows(e.role_in_project))
    }

    fn active_entry(&self, user_id: DbId) -> Option<&RosterEntry> {
        self.roster
            .iter()
            .find(|e| e.user_id == user_id && e.status == MemberStatus::Active)
    }
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    Ok,
    AdminOverride,
    AreaMismatch,
    NotMember,
}

impl AccessReason {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessReason::Ok => "ok",
            AccessReason::AdminOverride => "admin_override",
            AccessReason::AreaMismatch => "area_mismatch",
            AccessReason::NotMember => "not_member",
        }
    }
}

impl std::fmt::Display for AccessReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AccessReason> for CoreError {
    fn from(reason: AccessReason) -> Self {
        CoreError::Forbidden(format!("access denied: {reason}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub granted: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn grant(reason: AccessReason) -> Self {
        Self {
            granted: true,
            reason,
        }
    }

    fn deny(reason: AccessReason) -> Self {
        Self {
            granted: false,
            reason,
        }
    }
}

/// Decide whether `subject` may perform `action` on `target`.
pub fn resolve(
    subject: &AccessSubject,
    target: &AccessTarget,
    action: AccessAction,
    policy: AreaPolicy,
) -> AccessDecision {
    let decision = decide(subject, target, action, policy);
    tracing::debug!(
        user_id = subject.user_id,
        role = %subject.role,
        ?action,
        ?policy,
        granted = decision.granted,
        reason = %decision.reason,
        "Access resolved"
    );
    decision
}

/// Whether `subject` may create, list or revoke invitations for `target`.
///
/// Administrators always may. Otherwise an active coordinator or director
/// membership is required; owning the project as its student is not enough.
pub fn can_manage_invitations(subject: &AccessSubject, target: &AccessTarget) -> bool {
    subject.role.is_admin()
        || target
            .active_entry(subject.user_id)
            .is_some_and(|e| e.role_in_project.manages_invitations())
}

/// Area check applied before a user creates a project or joins one through
/// an invitation.
///
/// A user whose effective area is known may only use projects in that area.
/// Users with no effective area yet may go anywhere; their first project
/// then becomes the area they inherit.
pub fn check_join_area(
    subject: &AccessSubject,
    project_area: Option<DbId>,
    policy: AreaPolicy,
) -> Result<(), AccessReason> {
    if subject.role.is_admin() {
        return Ok(());
    }
    match (subject.effective_area(policy), project_area) {
        (Some(own), Some(project)) if own != project => Err(AccessReason::AreaMismatch),
        _ => Ok(()),
    }
}

fn decide(
    subject: &AccessSubject,
    target: &AccessTarget,
    action: AccessAction,
    policy: AreaPolicy,
) -> AccessDecision {
    if subject.role.is_admin() {
        return AccessDecision::grant(AccessReason::AdminOverride);
    }

    if let Some(target_area) = target.work_area_id {
        if subject.effective_area(policy) != Some(target_area) {
            return AccessDecision::deny(AccessReason::AreaMismatch);
        }
    }

    if target.owners.contains(&subject.user_id) {
        return AccessDecision::grant(AccessReason::Ok);
    }

    match target.active_entry(subject.user_id) {
        Some(entry) if action.allows(entry.role_in_project) => {
            AccessDecision::grant(AccessReason::Ok)
        }
        _ => AccessDecision::deny(AccessReason::NotMember),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: DbId = 7;
    const OTHER_AREA: DbId = 3;

    fn subject(user_id: DbId, role: Role, area: Option<DbId>) -> AccessSubject {
        AccessSubject {
            user_id,
            role,
            work_area_id: area,
            fallback_area_id: None,
        }
    }

    fn member(user_id: DbId, role: ProjectRole) -> RosterEntry {
        RosterEntry {
            user_id,
            role_in_project: role,
            status: MemberStatus::Active,
        }
    }

    fn project(area: Option<DbId>, roster: Vec<RosterEntry>) -> AccessTarget {
        AccessTarget {
            work_area_id: area,
            owners: Vec::new(),
            roster,
        }
    }

    fn view(s: &AccessSubject, t: &AccessTarget, policy: AreaPolicy) -> AccessDecision {
        resolve(s, t, AccessAction::View, policy)
    }

    #[test]
    fn admin_is_granted_in_any_area() {
        let admin = subject(1, Role::Administrator, Some(OTHER_AREA));
        for area in [Some(AREA), Some(OTHER_AREA), None] {
            for policy in [AreaPolicy::Strict, AreaPolicy::InheritFromMembership] {
                let decision = view(&admin, &project(area, vec![]), policy);
                assert!(decision.granted);
                assert_eq!(decision.reason, AccessReason::AdminOverride);
            }
        }
    }

    #[test]
    fn admin_without_area_is_still_granted() {
        let admin = subject(1, Role::Administrator, None);
        let decision = resolve(
            &admin,
            &project(Some(AREA), vec![]),
            AccessAction::Review,
            AreaPolicy::Strict,
        );
        assert_eq!(decision.reason, AccessReason::AdminOverride);
    }

    #[test]
    fn mismatched_area_is_denied_even_for_members_and_owners() {
        let user = subject(2, Role::Student, Some(OTHER_AREA));
        let target = project(Some(AREA), vec![member(2, ProjectRole::Student)]).with_owner(Some(2));

        let decision = view(&user, &target, AreaPolicy::InheritFromMembership);
        assert!(!decision.granted);
        assert_eq!(decision.reason, AccessReason::AreaMismatch);
    }

    #[test]
    fn every_non_admin_role_is_denied_across_areas() {
        for role in Role::ALL.into_iter().filter(|r| !r.is_admin()) {
            let user = subject(2, role, Some(OTHER_AREA));
            let target = project(Some(AREA), vec![member(2, ProjectRole::default_for(role))]);
            let decision = view(&user, &target, AreaPolicy::Strict);
            assert_eq!(decision.reason, AccessReason::AreaMismatch, "role {role}");
        }
    }

    #[test]
    fn active_member_in_same_area_is_granted() {
        let user = subject(2, Role::Coordinator, Some(AREA));
        let target = project(Some(AREA), vec![member(2, ProjectRole::Coordinator)]);

        let decision = view(&user, &target, AreaPolicy::Strict);
        assert!(decision.granted);
        assert_eq!(decision.reason, AccessReason::Ok);
    }

    #[test]
    fn owner_without_membership_row_is_granted() {
        let user = subject(2, Role::Student, Some(AREA));
        let target = project(Some(AREA), vec![]).with_owner(Some(2));

        let decision = resolve(&user, &target, AccessAction::Contribute, AreaPolicy::Strict);
        assert_eq!(decision.reason, AccessReason::Ok);
    }

    #[test]
    fn same_area_non_member_is_denied() {
        let user = subject(9, Role::Evaluator, Some(AREA));
        let target = project(Some(AREA), vec![member(2, ProjectRole::Student)]);

        let decision = view(&user, &target, AreaPolicy::Strict);
        assert!(!decision.granted);
        assert_eq!(decision.reason, AccessReason::NotMember);
    }

    #[test]
    fn inactive_member_is_not_a_member() {
        let user = subject(2, Role::Student, Some(AREA));
        let mut entry = member(2, ProjectRole::Student);
        entry.status = MemberStatus::Inactive;

        let decision = view(&user, &project(Some(AREA), vec![entry]), AreaPolicy::Strict);
        assert_eq!(decision.reason, AccessReason::NotMember);
    }

    #[test]
    fn null_area_member_is_granted_when_inheriting_from_first_membership() {
        let mut user = subject(2, Role::Student, None);
        user.fallback_area_id = Some(AREA);
        let target = project(Some(AREA), vec![member(2, ProjectRole::Student)]);

        let inherited = view(&user, &target, AreaPolicy::InheritFromMembership);
        assert!(inherited.granted);
        assert_eq!(inherited.reason, AccessReason::Ok);

        let strict = view(&user, &target, AreaPolicy::Strict);
        assert!(!strict.granted);
        assert_eq!(strict.reason, AccessReason::AreaMismatch);
    }

    #[test]
    fn null_area_without_any_membership_is_denied() {
        let user = subject(2, Role::Student, None);
        let decision = view(
            &user,
            &project(Some(AREA), vec![]),
            AreaPolicy::InheritFromMembership,
        );
        assert_eq!(decision.reason, AccessReason::AreaMismatch);
    }

    #[test]
    fn own_area_takes_precedence_over_inherited_area() {
        let mut user = subject(2, Role::Student, Some(OTHER_AREA));
        user.fallback_area_id = Some(AREA);
        assert_eq!(user.effective_area(AreaPolicy::InheritFromMembership), Some(OTHER_AREA));
    }

    #[test]
    fn unscoped_target_skips_area_check() {
        let user = subject(2, Role::Student, None);
        let target = project(None, vec![member(2, ProjectRole::Student)]);

        let decision = view(&user, &target, AreaPolicy::Strict);
        assert_eq!(decision.reason, AccessReason::Ok);
    }

    #[test]
    fn evaluator_members_can_review_but_not_contribute() {
        let user = subject(4, Role::Evaluator, Some(AREA));
        let target = project(Some(AREA), vec![member(4, ProjectRole::Evaluator)]);

        let review = resolve(&user, &target, AccessAction::Review, AreaPolicy::Strict);
        assert!(review.granted);

        let contribute = resolve(&user, &target, AccessAction::Contribute, AreaPolicy::Strict);
        assert!(!contribute.granted);
        assert_eq!(contribute.reason, AccessReason::NotMember);
    }

    #[test]
    fn student_members_cannot_review() {
        let user = subject(2, Role::Student, Some(AREA));
        let target = project(Some(AREA), vec![member(2, ProjectRole::Student)]);

        let decision = resolve(&user, &target, AccessAction::Review, AreaPolicy::Strict);
        assert_eq!(decision.reason, AccessReason::NotMember);
    }

    #[test]
    fn with_owner_ignores_missing_and_duplicate_ids() {
        let target = AccessTarget::default()
            .with_owner(Some(5))
            .with_owner(None)
            .with_owner(Some(5));
        assert_eq!(target.owners, vec![5]);
    }

    #[test]
    fn contributors_are_owners_and_active_contributing_members() {
        let mut inactive = member(3, ProjectRole::Student);
        inactive.status = MemberStatus::Inactive;
        let target = project(
            Some(1),
            vec![
                member(2, ProjectRole::Coordinator),
                inactive,
                member(5, ProjectRole::Evaluator),
            ],
        )
        .with_owner(Some(1));

        assert!(target.is_contributor(1));
        assert!(target.is_contributor(2));
        assert!(!target.is_contributor(3));
        assert!(!target.is_contributor(4));
        assert!(!target.is_contributor(5));
    }

    #[test]
    fn denial_reason_becomes_forbidden_error() {
        let err = CoreError::from(AccessReason::AreaMismatch);
        assert_matches::assert_matches!(
            err,
            CoreError::Forbidden(ref msg) if msg == "access denied: area_mismatch"
        );
    }

    #[test]
    fn policy_parses_env_values() {
        assert_eq!(AreaPolicy::parse("strict"), Some(AreaPolicy::Strict));
        assert_eq!(
            AreaPolicy::parse(" Inherit "),
            Some(AreaPolicy::InheritFromMembership)
        );
        assert_eq!(AreaPolicy::parse("deny"), None);
    }

    #[test]
    fn only_admins_and_managing_members_handle_invitations() {
        let target = project(
            Some(AREA),
            vec![
                member(1, ProjectRole::Coordinator),
                member(2, ProjectRole::Student),
                member(3, ProjectRole::Director),
            ],
        )
        .with_owner(Some(2));

        assert!(can_manage_invitations(&subject(1, Role::Coordinator, Some(AREA)), &target));
        assert!(can_manage_invitations(&subject(3, Role::Director, Some(AREA)), &target));
        assert!(!can_manage_invitations(&subject(2, Role::Student, Some(AREA)), &target));
        assert!(!can_manage_invitations(&subject(4, Role::Coordinator, Some(AREA)), &target));
        assert!(can_manage_invitations(&subject(9, Role::Administrator, None), &target));
    }

    #[test]
    fn joining_requires_matching_area_only_when_one_is_known() {
        let scoped = subject(1, Role::Student, Some(AREA));
        assert_eq!(
            check_join_area(&scoped, Some(OTHER_AREA), AreaPolicy::default()),
            Err(AccessReason::AreaMismatch)
        );
        assert_eq!(check_join_area(&scoped, Some(AREA), AreaPolicy::default()), Ok(()));
        assert_eq!(check_join_area(&scoped, None, AreaPolicy::default()), Ok(()));

        let unscoped = subject(2, Role::Student, None);
        assert_eq!(
            check_join_area(&unscoped, Some(OTHER_AREA), AreaPolicy::Strict),
            Ok(())
        );

        let inherited = AccessSubject {
            fallback_area_id: Some(AREA),
            ..unscoped
        };
        assert_eq!(
            check_join_area(&inherited, Some(OTHER_AREA), AreaPolicy::InheritFromMembership),
            Err(AccessReason::AreaMismatch)
        );
        assert_eq!(
            check_join_area(&inherited, Some(OTHER_AREA), AreaPolicy::Strict),
            Ok(())
        );
    }
}
