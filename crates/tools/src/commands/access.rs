//! `explain-access`: run the resolver for one user and project and print
//! every input it looked at.

use anyhow::{Context, Result};
use gestion_core::access::{resolve, AccessAction, AreaPolicy};
use gestion_core::types::DbId;
use gestion_db::access::AccessRepo;
use gestion_db::repositories::ProjectRepo;
use gestion_db::DbPool;

pub async fn explain_access(
    pool: &DbPool,
    user_id: DbId,
    project_id: DbId,
    action: AccessAction,
    policy: AreaPolicy,
) -> Result<()> {
    let subject = AccessRepo::load_subject(pool, user_id)
        .await?
        .with_context(|| format!("User {user_id} does not exist or is inactive"))?;
    let project = ProjectRepo::find_by_id(pool, project_id)
        .await?
        .with_context(|| format!("Project {project_id} does not exist"))?;
    let target = AccessRepo::project_target(pool, &project).await?;

    let decision = resolve(&subject, &target, action, policy);

    println!("user            {} ({})", subject.user_id, subject.role);
    println!("own area        {}", show(subject.work_area_id));
    println!("inherited area  {}", show(subject.fallback_area_id));
    println!("effective area  {}  [{policy:?}]", show(subject.effective_area(policy)));
    println!("project         {} {:?}", project.id, project.title);
    println!("project area    {}", show(target.work_area_id));
    println!("owners          {:?}", target.owners);
    match target.roster.iter().find(|e| e.user_id == subject.user_id) {
        Some(entry) => println!(
            "membership      {} ({})",
            entry.role_in_project,
            entry.status.as_str()
        ),
        None => println!("membership      none"),
    }
    println!("action          {action:?}");
    println!(
        "decision        {} ({})",
        if decision.granted { "GRANTED" } else { "DENIED" },
        decision.reason
    );
    Ok(())
}

fn show(area: Option<DbId>) -> String {
    area.map_or_else(|| "NULL".to_string(), |id| id.to_string())
}
