//! Loaders that turn rows into access-resolver inputs.
//!
//! The resolver in [`gestion_core::access`] does no I/O. Everything it needs
//! (the subject's area, the fallback area from their first active membership,
//! the target's owners and roster) is fetched here.

use std::collections::HashMap;

use gestion_core::access::{AccessSubject, AccessTarget};
use gestion_core::error::CoreError;
use gestion_core::roles::Role;
use gestion_core::types::DbId;
use sqlx::{FromRow, PgPool};

use crate::error::DbError;
use crate::models::deliverable::Deliverable;
use crate::models::project::Project;
use crate::models::project_member::ProjectMember;
use crate::repositories::project_member_repo::ProjectMemberRepo;

/// Work area of the project behind a user's earliest active membership.
///
/// Expects the outer query to alias `usuarios` as `u`.
const FALLBACK_AREA_SUBQUERY: &str = "(SELECT p.work_area_id
      FROM proyecto_usuarios pu
      JOIN proyectos p ON p.id = pu.project_id
      WHERE pu.user_id = u.id AND pu.status = 'active'
      ORDER BY pu.joined_at ASC, pu.id ASC
      LIMIT 1)";

#[derive(Debug, FromRow)]
struct SubjectRow {
    id: DbId,
    role_id: DbId,
    work_area_id: Option<DbId>,
    fallback_area_id: Option<DbId>,
}

impl SubjectRow {
    fn into_subject(self) -> Result<AccessSubject, CoreError> {
        let role = Role::from_id(self.role_id).ok_or_else(|| {
            CoreError::Internal(format!("User {} has unknown role_id {}", self.id, self.role_id))
        })?;
        Ok(AccessSubject {
            user_id: self.id,
            role,
            work_area_id: self.work_area_id,
            fallback_area_id: self.fallback_area_id,
        })
    }
}

/// An active membership together with every area the resolver would compare.
#[derive(Debug, Clone, FromRow)]
pub struct MemberAreaRow {
    pub project_id: DbId,
    pub project_title: String,
    pub project_work_area_id: Option<DbId>,
    pub user_id: DbId,
    pub user_email: String,
    pub role_id: DbId,
    pub user_work_area_id: Option<DbId>,
    pub fallback_area_id: Option<DbId>,
}

impl MemberAreaRow {
    /// The member as the resolver would see them.
    pub fn subject(&self) -> Result<AccessSubject, CoreError> {
        SubjectRow {
            id: self.user_id,
            role_id: self.role_id,
            work_area_id: self.user_work_area_id,
            fallback_area_id: self.fallback_area_id,
        }
        .into_subject()
    }
}

/// Builds [`AccessSubject`] and [`AccessTarget`] values from the database.
pub struct AccessRepo;

impl AccessRepo {
    /// Load an active user as an access subject.
    ///
    /// Returns `Ok(None)` if the user does not exist or is deactivated.
    pub async fn load_subject(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<AccessSubject>, DbError> {
        let query = format!(
            "SELECT u.id, u.role_id, u.work_area_id, {FALLBACK_AREA_SUBQUERY} AS fallback_area_id
             FROM usuarios u
             WHERE u.id = $1 AND u.is_active = true"
        );
        let row = sqlx::query_as::<_, SubjectRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(SubjectRow::into_subject).transpose()?)
    }

    /// Access target for one project: its area, owners and full roster.
    pub async fn project_target(pool: &PgPool, project: &Project) -> Result<AccessTarget, DbError> {
        let members = ProjectMemberRepo::list_by_project(pool, project.id).await?;
        Ok(build_target(project, &members)?)
    }

    /// Access targets for many projects with a single roster query.
    pub async fn project_targets(
        pool: &PgPool,
        projects: &[Project],
    ) -> Result<HashMap<DbId, AccessTarget>, DbError> {
        let ids: Vec<DbId> = projects.iter().map(|p| p.id).collect();
        let members = ProjectMemberRepo::list_by_projects(pool, &ids).await?;

        let mut by_project: HashMap<DbId, Vec<ProjectMember>> = HashMap::new();
        for member in members {
            by_project.entry(member.project_id).or_default().push(member);
        }

        let mut targets = HashMap::with_capacity(projects.len());
        for project in projects {
            let roster = by_project.remove(&project.id).unwrap_or_default();
            targets.insert(project.id, build_target(project, &roster)?);
        }
        Ok(targets)
    }

    /// Access target for a deliverable: the project's target with the
    /// deliverable's assignee added as an owner.
    pub async fn deliverable_target(
        pool: &PgPool,
        project: &Project,
        deliverable: &Deliverable,
    ) -> Result<AccessTarget, DbError> {
        let target = Self::project_target(pool, project).await?;
        Ok(target.with_owner(deliverable.assignee_id))
    }

    /// Every active membership with the user's own, fallback and project areas.
    pub async fn active_member_areas(pool: &PgPool) -> Result<Vec<MemberAreaRow>, sqlx::Error> {
        let query = format!(
            "SELECT m.project_id, p.title AS project_title, p.work_area_id AS project_work_area_id,
                    u.id AS user_id, u.email AS user_email, u.role_id,
                    u.work_area_id AS user_work_area_id,
                    {FALLBACK_AREA_SUBQUERY} AS fallback_area_id
             FROM proyecto_usuarios m
             JOIN proyectos p ON p.id = m.project_id
             JOIN usuarios u ON u.id = m.user_id
             WHERE m.status = 'active' AND u.is_active = true
             ORDER BY m.project_id ASC, u.id ASC"
        );
        sqlx::query_as::<_, MemberAreaRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Fallback area for each active user without a work area of their own.
    ///
    /// Returns `(user_id, email, fallback_area_id)` triples.
    pub async fn null_area_fallbacks(
        pool: &PgPool,
    ) -> Result<Vec<(DbId, String, Option<DbId>)>, sqlx::Error> {
        let query = format!(
            "SELECT u.id, u.email, {FALLBACK_AREA_SUBQUERY} AS fallback_area_id
             FROM usuarios u
             WHERE u.work_area_id IS NULL AND u.is_active = true
             ORDER BY u.id ASC"
        );
        sqlx::query_as::<_, (DbId, String, Option<DbId>)>(&query)
            .fetch_all(pool)
            .await
    }
}

fn build_target(project: &Project, members: &[ProjectMember]) -> Result<AccessTarget, CoreError> {
    let roster = members
        .iter()
        .map(ProjectMember::roster_entry)
        .collect::<Result<Vec<_>, _>>()?;

    let target = AccessTarget {
        work_area_id: project.work_area_id,
        owners: Vec::new(),
        roster,
    };
    Ok(target
        .with_owner(project.student_id)
        .with_owner(project.director_id))
}
