//! `repair-memberships`: give every project owner an active membership row.
//!
//! Owners already resolve as granted without a row, but rosters, invitation
//! management and the inherited work area all read `proyecto_usuarios`.

use anyhow::Result;
use gestion_core::membership::ProjectRole;
use gestion_db::repositories::ProjectMemberRepo;
use gestion_db::{is_benign_schema_error, DbPool};

/// Restores the one-row-per-(project, user) rule on databases that predate it.
const ENSURE_UNIQUE_MEMBERSHIP: &str = "ALTER TABLE proyecto_usuarios \
     ADD CONSTRAINT uq_proyecto_usuarios_project_user UNIQUE (project_id, user_id)";

pub async fn repair_memberships(pool: &DbPool, apply: bool) -> Result<()> {
    if apply {
        ensure_unique_membership(pool).await?;
    }

    let missing = ProjectMemberRepo::find_missing_owner_memberships(pool).await?;
    if missing.is_empty() {
        println!("Every project owner already has a membership row");
        return Ok(());
    }

    let mut inserted = 0;
    for (project_id, user_id, role) in &missing {
        let role = ProjectRole::parse(role)?;
        if apply {
            if ProjectMemberRepo::insert_if_missing(pool, *project_id, *user_id, role).await? {
                inserted += 1;
                println!("  added {role} {user_id} to project {project_id}");
            }
        } else {
            println!("  would add {role} {user_id} to project {project_id}");
        }
    }

    if apply {
        tracing::info!(inserted, "Owner memberships repaired");
    } else {
        println!(
            "{} membership(s) missing; re-run with --apply to insert them",
            missing.len()
        );
    }
    Ok(())
}

async fn ensure_unique_membership(pool: &DbPool) -> Result<()> {
    match sqlx::query(ENSURE_UNIQUE_MEMBERSHIP).execute(pool).await {
        Ok(_) => {
            tracing::info!("Added unique constraint on proyecto_usuarios (project_id, user_id)");
            Ok(())
        }
        Err(err) if is_benign_schema_error(&err) => {
            tracing::debug!("Membership unique constraint already present");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
