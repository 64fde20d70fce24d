//! Repository for the `proyecto_usuarios` table.
//!
//! `(project_id, user_id)` is unique, so every write is an upsert.

use gestion_core::membership::{MemberStatus, ProjectRole};
use gestion_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::project_member::{ProjectMember, ProjectMemberDetail};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, project_id, user_id, role_in_project, status, joined_at, created_at, updated_at";

/// Provides membership queries and upserts.
pub struct ProjectMemberRepo;

impl ProjectMemberRepo {
    /// Create or update a membership row with an explicit role and status.
    pub async fn upsert(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
        role: ProjectRole,
        status: MemberStatus,
    ) -> Result<ProjectMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO proyecto_usuarios (project_id, user_id, role_in_project, status)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (project_id, user_id) DO UPDATE SET
                role_in_project = EXCLUDED.role_in_project,
                status = EXCLUDED.status
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_id)
            .bind(user_id)
            .bind(role.as_str())
            .bind(status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Create or reactivate a membership inside an open transaction.
    pub async fn upsert_active(
        conn: &mut PgConnection,
        project_id: DbId,
        user_id: DbId,
        role: ProjectRole,
    ) -> Result<ProjectMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO proyecto_usuarios (project_id, user_id, role_in_project, status)
             VALUES ($1, $2, $3, 'active')
             ON CONFLICT (project_id, user_id) DO UPDATE SET
                role_in_project = EXCLUDED.role_in_project,
                status = 'active'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_id)
            .bind(user_id)
            .bind(role.as_str())
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<ProjectMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proyecto_usuarios WHERE project_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// All membership rows (active and inactive) for one project.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proyecto_usuarios
             WHERE project_id = $1
             ORDER BY joined_at ASC, id ASC"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Membership rows for many projects at once, used to build access targets in bulk.
    pub async fn list_by_projects(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<ProjectMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proyecto_usuarios
             WHERE project_id = ANY($1)
             ORDER BY project_id ASC, joined_at ASC, id ASC"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_ids)
            .fetch_all(pool)
            .await
    }

    /// Roster with user names for display.
    pub async fn list_details(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectMemberDetail>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMemberDetail>(
            "SELECT pu.id, pu.project_id, pu.user_id,
                    u.name AS user_name, u.email AS user_email,
                    pu.role_in_project, pu.status, pu.joined_at
             FROM proyecto_usuarios pu
             JOIN usuarios u ON u.id = pu.user_id
             WHERE pu.project_id = $1
             ORDER BY pu.joined_at ASC, pu.id ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Mark a membership inactive. Returns `true` if an active row was changed.
    pub async fn deactivate(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE proyecto_usuarios SET status = 'inactive'
             WHERE project_id = $1 AND user_id = $2 AND status = 'active'",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Owners (`student_id`/`director_id`) that have no membership row at all.
    ///
    /// Returns `(project_id, user_id, role)` triples.
    pub async fn find_missing_owner_memberships(
        pool: &PgPool,
    ) -> Result<Vec<(DbId, DbId, String)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, DbId, String)>(
            "SELECT p.id, o.user_id, o.role
             FROM proyectos p
             CROSS JOIN LATERAL (VALUES
                 (p.student_id, 'student'),
                 (p.director_id, 'director')
             ) AS o(user_id, role)
             WHERE o.user_id IS NOT NULL
               AND NOT EXISTS (
                   SELECT 1 FROM proyecto_usuarios pu
                   WHERE pu.project_id = p.id AND pu.user_id = o.user_id
               )
             ORDER BY p.id ASC, o.role DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Insert a membership only if none exists. Returns `true` if a row was inserted.
    pub async fn insert_if_missing(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
        role: ProjectRole,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO proyecto_usuarios (project_id, user_id, role_in_project, status)
             VALUES ($1, $2, $3, 'active')
             ON CONFLICT (project_id, user_id) DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count membership rows for a `(project, user)` pair. Used to verify uniqueness.
    pub async fn count_for(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM proyecto_usuarios WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
