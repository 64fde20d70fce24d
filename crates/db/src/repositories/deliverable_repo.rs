//! Repository for the `entregables` and `historial_entregables` tables.

use gestion_core::deliverable::validate_transition;
use gestion_core::error::CoreError;
use gestion_core::status::DeliverableStatus;
use gestion_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::deliverable::{
    CreateDeliverable, Deliverable, DeliverableHistoryEntry, TransitionChanges,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, phase, title, description, status_id, original_file, \
                        submitted_file, assignee_id, due_date, submitted_at, reviewed_at, \
                        feedback, created_at, updated_at";

const HISTORY_COLUMNS: &str =
    "id, deliverable_id, from_status_id, to_status_id, changed_by, note, created_at";

/// Provides deliverable CRUD and status transitions.
pub struct DeliverableRepo;

impl DeliverableRepo {
    /// Insert a new deliverable in `pending` status.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateDeliverable,
    ) -> Result<Deliverable, sqlx::Error> {
        let query = format!(
            "INSERT INTO entregables
                (project_id, phase, title, description, status_id, original_file, assignee_id, due_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deliverable>(&query)
            .bind(project_id)
            .bind(&input.phase)
            .bind(&input.title)
            .bind(&input.description)
            .bind(DeliverableStatus::Pending.id())
            .bind(&input.original_file)
            .bind(input.assignee_id)
            .bind(input.due_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Deliverable>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM entregables WHERE id = $1");
        sqlx::query_as::<_, Deliverable>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's deliverables by due date, undated last.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Deliverable>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM entregables
             WHERE project_id = $1
             ORDER BY due_date ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, Deliverable>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Status history of one deliverable, oldest first.
    pub async fn history(
        pool: &PgPool,
        deliverable_id: DbId,
    ) -> Result<Vec<DeliverableHistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM historial_entregables
             WHERE deliverable_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, DeliverableHistoryEntry>(&query)
            .bind(deliverable_id)
            .fetch_all(pool)
            .await
    }

    /// User behind the most recent transition into `submitted`, if any.
    pub async fn last_submitter(
        pool: &PgPool,
        deliverable_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let submitter: Option<Option<DbId>> = sqlx::query_scalar(
            "SELECT changed_by FROM historial_entregables
             WHERE deliverable_id = $1 AND to_status_id = $2
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        )
        .bind(deliverable_id)
        .bind(DeliverableStatus::Submitted.id())
        .fetch_optional(pool)
        .await?;
        Ok(submitter.flatten())
    }

    /// Move a deliverable to `to`, recording the change in its history.
    ///
    /// The row is locked for the duration so two reviewers cannot both act on
    /// the same `under_review` deliverable. Entering `submitted` stores the
    /// file reference and submission time; leaving review stores feedback and
    /// the review time.
    ///
    /// Returns `Ok(None)` if the deliverable does not exist.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        to: DeliverableStatus,
        changed_by: DbId,
        note: Option<&str>,
        changes: &TransitionChanges,
    ) -> Result<Option<Deliverable>, DbError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM entregables WHERE id = $1 FOR UPDATE");
        let current = sqlx::query_as::<_, Deliverable>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let from = DeliverableStatus::from_id(current.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "Deliverable {id} has unknown status_id {}",
                current.status_id
            ))
        })?;
        validate_transition(from, to)?;

        let submitting = to == DeliverableStatus::Submitted;
        let reviewed = matches!(
            to,
            DeliverableStatus::Accepted
                | DeliverableStatus::Rejected
                | DeliverableStatus::ChangesRequested
        );

        let update = format!(
            "UPDATE entregables SET
                status_id = $2,
                submitted_file = CASE WHEN $3 THEN COALESCE($4, submitted_file) ELSE submitted_file END,
                submitted_at = CASE WHEN $3 THEN NOW() ELSE submitted_at END,
                feedback = CASE WHEN $5 THEN $6 ELSE feedback END,
                reviewed_at = CASE WHEN $5 THEN NOW() ELSE reviewed_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Deliverable>(&update)
            .bind(id)
            .bind(to.id())
            .bind(submitting)
            .bind(&changes.submitted_file)
            .bind(reviewed)
            .bind(&changes.feedback)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO historial_entregables
                (deliverable_id, from_status_id, to_status_id, changed_by, note)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(from.id())
        .bind(to.id())
        .bind(changed_by)
        .bind(note)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            deliverable_id = id,
            project_id = updated.project_id,
            from = %from,
            to = %to,
            changed_by,
            "Deliverable status changed"
        );
        Ok(Some(updated))
    }
}
