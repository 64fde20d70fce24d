//! Repository for the `invitaciones` table.

use chrono::Utc;
use gestion_core::error::CoreError;
use gestion_core::invitation::{check_acceptable, normalize_code};
use gestion_core::membership::ProjectRole;
use gestion_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::invitation::{AcceptOutcome, CreateInvitation, Invitation};
use crate::models::project_member::ProjectMember;
use crate::repositories::project_member_repo::ProjectMemberRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, code, role_in_project, max_uses, uses, expires_at, \
                        revoked_at, created_by, last_accepted_at, created_at, updated_at";

const MEMBER_COLUMNS: &str =
    "id, project_id, user_id, role_in_project, status, joined_at, created_at, updated_at";

/// Provides invitation CRUD and transactional acceptance.
pub struct InvitationRepo;

impl InvitationRepo {
    /// Insert a new invitation, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateInvitation,
    ) -> Result<Invitation, sqlx::Error> {
        let query = format!(
            "INSERT INTO invitaciones
                (project_id, code, role_in_project, max_uses, expires_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(input.project_id)
            .bind(normalize_code(&input.code))
            .bind(input.role_in_project.as_str())
            .bind(input.max_uses)
            .bind(input.expires_at)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invitaciones WHERE id = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invitaciones WHERE code = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(normalize_code(code))
            .fetch_optional(pool)
            .await
    }

    /// List a project's invitations, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Invitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invitaciones
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Revoke an invitation of the given project. Returns `true` if a row was revoked.
    pub async fn revoke(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invitaciones SET revoked_at = NOW()
             WHERE id = $1 AND project_id = $2 AND revoked_at IS NULL",
        )
        .bind(id)
        .bind(project_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Accept an invitation code on behalf of `user_id`.
    ///
    /// Runs in a single transaction holding a row lock on the invitation, so
    /// the use counter and the membership row are written together and
    /// concurrent acceptances of a single-use code cannot both succeed.
    ///
    /// `may_join` runs after the existing-membership lookup and only for
    /// users who are not already active members; an error from it aborts the
    /// acceptance without consuming a use.
    ///
    /// Returns `Ok(None)` if the code does not exist.
    pub async fn accept<F>(
        pool: &PgPool,
        code: &str,
        user_id: DbId,
        may_join: F,
    ) -> Result<Option<AcceptOutcome>, DbError>
    where
        F: FnOnce(&Invitation) -> Result<(), CoreError>,
    {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM invitaciones WHERE code = $1 FOR UPDATE");
        let invitation = sqlx::query_as::<_, Invitation>(&query)
            .bind(normalize_code(code))
            .fetch_optional(&mut *tx)
            .await?;

        let Some(invitation) = invitation else {
            return Ok(None);
        };

        let member_query = format!(
            "SELECT {MEMBER_COLUMNS} FROM proyecto_usuarios
             WHERE project_id = $1 AND user_id = $2
             FOR UPDATE"
        );
        let existing = sqlx::query_as::<_, ProjectMember>(&member_query)
            .bind(invitation.project_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(member) = existing.filter(ProjectMember::is_active) {
            tracing::debug!(
                invitation_id = invitation.id,
                project_id = invitation.project_id,
                user_id,
                "Invitation accepted by existing member, no use consumed"
            );
            tx.commit().await?;
            return Ok(Some(AcceptOutcome::AlreadyMember(member)));
        }

        may_join(&invitation)?;
        check_acceptable(&invitation.state(), Utc::now()).map_err(CoreError::from)?;

        let role = ProjectRole::parse(&invitation.role_in_project)?;
        let member =
            ProjectMemberRepo::upsert_active(&mut tx, invitation.project_id, user_id, role).await?;

        sqlx::query(
            "UPDATE invitaciones SET uses = uses + 1, last_accepted_at = NOW() WHERE id = $1",
        )
        .bind(invitation.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            invitation_id = invitation.id,
            project_id = invitation.project_id,
            user_id,
            role = %role,
            "Invitation accepted"
        );
        Ok(Some(AcceptOutcome::Joined(member)))
    }
}
