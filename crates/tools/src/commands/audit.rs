//! `audit`: read-only report of data that makes access decisions surprising.

use anyhow::Result;
use gestion_core::access::AreaPolicy;
use gestion_core::roles::Role;
use gestion_core::types::DbId;
use gestion_db::access::{AccessRepo, MemberAreaRow};
use gestion_db::repositories::ProjectMemberRepo;
use gestion_db::DbPool;

pub async fn audit(pool: &DbPool, policy: AreaPolicy) -> Result<()> {
    let null_areas = AccessRepo::null_area_fallbacks(pool).await?;
    println!("== Users without a work area ({}) ==", null_areas.len());
    for (user_id, email, fallback) in &null_areas {
        match fallback {
            Some(area) => println!("  user {user_id} <{email}> inherits area {area}"),
            None => println!("  user {user_id} <{email}> has no membership to inherit from"),
        }
    }

    let rows = AccessRepo::active_member_areas(pool).await?;
    let mismatches = area_mismatches(&rows, policy);
    println!(
        "== Active members outside their project's area ({}) [{policy:?}] ==",
        mismatches.len()
    );
    for (row, effective) in &mismatches {
        println!(
            "  project {} {:?} (area {}): user {} <{}> effective area {}",
            row.project_id,
            row.project_title,
            row.project_work_area_id.unwrap_or_default(),
            row.user_id,
            row.user_email,
            effective.map_or_else(|| "NULL".to_string(), |a| a.to_string()),
        );
    }

    let missing = ProjectMemberRepo::find_missing_owner_memberships(pool).await?;
    println!("== Owners without a membership row ({}) ==", missing.len());
    for (project_id, user_id, role) in &missing {
        println!("  project {project_id}: {role} {user_id}");
    }

    tracing::info!(
        null_area_users = null_areas.len(),
        area_mismatches = mismatches.len(),
        missing_owner_memberships = missing.len(),
        "Audit complete"
    );
    Ok(())
}

/// Members of area-scoped projects whose effective area differs from the
/// project's, paired with that effective area. Administrators are skipped
/// since they bypass area checks.
fn area_mismatches(
    rows: &[MemberAreaRow],
    policy: AreaPolicy,
) -> Vec<(&MemberAreaRow, Option<DbId>)> {
    rows.iter()
        .filter_map(|row| {
            let project_area = row.project_work_area_id?;
            let subject = match row.subject() {
                Ok(subject) => subject,
                Err(err) => {
                    tracing::warn!(user_id = row.user_id, error = %err, "Skipping member");
                    return None;
                }
            };
            if subject.role == Role::Administrator {
                return None;
            }
            let effective = subject.effective_area(policy);
            (effective != Some(project_area)).then_some((row, effective))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        role: Role,
        own: Option<DbId>,
        fallback: Option<DbId>,
        project: Option<DbId>,
    ) -> MemberAreaRow {
        MemberAreaRow {
            project_id: 1,
            project_title: "Tesis".into(),
            project_work_area_id: project,
            user_id: 10,
            user_email: "ana@uni.edu".into(),
            role_id: role.id(),
            user_work_area_id: own,
            fallback_area_id: fallback,
        }
    }

    #[test]
    fn inherited_area_only_counts_under_inherit_policy() {
        let rows = vec![row(Role::Student, None, Some(7), Some(7))];

        assert!(area_mismatches(&rows, AreaPolicy::InheritFromMembership).is_empty());
        assert_eq!(area_mismatches(&rows, AreaPolicy::Strict).len(), 1);
    }

    #[test]
    fn admins_and_unscoped_projects_are_skipped() {
        let rows = vec![
            row(Role::Administrator, Some(3), None, Some(7)),
            row(Role::Director, Some(3), None, None),
        ];

        assert!(area_mismatches(&rows, AreaPolicy::Strict).is_empty());
    }

    #[test]
    fn own_area_mismatch_is_reported() {
        let rows = vec![row(Role::Evaluator, Some(3), Some(7), Some(7))];

        assert_eq!(
            area_mismatches(&rows, AreaPolicy::InheritFromMembership).len(),
            1
        );
    }
}
