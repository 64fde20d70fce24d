//! Request-side glue for the access resolver.
//!
//! Every project or deliverable handler goes through one of the `authorize_*`
//! functions: load the row (404 if missing), load the caller as an
//! [`AccessSubject`], build the target, resolve, and turn a denial into a 403
//! whose message carries the reason code.

use gestion_core::access::{resolve, AccessAction, AccessDecision, AccessSubject, AccessTarget};
use gestion_core::error::CoreError;
use gestion_core::types::DbId;
use gestion_db::access::AccessRepo;
use gestion_db::models::deliverable::Deliverable;
use gestion_db::models::project::Project;
use gestion_db::repositories::{DeliverableRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// A project the caller has been granted access to.
pub struct ProjectAccess {
    pub project: Project,
    pub subject: AccessSubject,
    pub target: AccessTarget,
}

/// A deliverable the caller has been granted access to.
pub struct DeliverableAccess {
    pub deliverable: Deliverable,
    pub project: Project,
    pub subject: AccessSubject,
}

/// Load the caller as an access subject.
///
/// A valid token for a user that has since been deactivated is rejected.
pub async fn load_subject(state: &AppState, user: &AuthUser) -> AppResult<AccessSubject> {
    AccessRepo::load_subject(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account is not active".into())))
}

pub async fn find_project(state: &AppState, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// Resolve `action` on `target` for `subject` under the configured policy.
pub fn decide(
    state: &AppState,
    subject: &AccessSubject,
    target: &AccessTarget,
    action: AccessAction,
) -> AccessDecision {
    resolve(subject, target, action, state.config.access_policy)
}

fn ensure_granted(decision: AccessDecision) -> AppResult<()> {
    if decision.granted {
        Ok(())
    } else {
        Err(AppError::access_denied(decision.reason))
    }
}

/// Load a project and require `action` on it.
pub async fn authorize_project(
    state: &AppState,
    user: &AuthUser,
    project_id: DbId,
    action: AccessAction,
) -> AppResult<ProjectAccess> {
    let project = find_project(state, project_id).await?;
    let subject = load_subject(state, user).await?;
    let target = AccessRepo::project_target(&state.pool, &project).await?;

    ensure_granted(decide(state, &subject, &target, action))?;

    Ok(ProjectAccess {
        project,
        subject,
        target,
    })
}

/// Load a deliverable with its project and require `action` on it.
///
/// The deliverable's assignee counts as an owner in addition to the
/// project's student and director.
pub async fn authorize_deliverable(
    state: &AppState,
    user: &AuthUser,
    deliverable_id: DbId,
    action: AccessAction,
) -> AppResult<DeliverableAccess> {
    let deliverable = DeliverableRepo::find_by_id(&state.pool, deliverable_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Deliverable",
            id: deliverable_id,
        }))?;
    let project = find_project(state, deliverable.project_id).await?;
    let subject = load_subject(state, user).await?;
    let target = AccessRepo::deliverable_target(&state.pool, &project, &deliverable).await?;

    ensure_granted(decide(state, &subject, &target, action))?;

    Ok(DeliverableAccess {
        deliverable,
        project,
        subject,
    })
}
