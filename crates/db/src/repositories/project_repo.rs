//! Repository for the `proyectos` table.

use gestion_core::membership::ProjectRole;
use gestion_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::project::{AssignProject, CreateProject, Project, UpdateProject};
use crate::repositories::project_member_repo::ProjectMemberRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, status_id, student_id, director_id, \
                        work_area_id, created_by, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// If `status_id` is `None` in the input, defaults to 1 (Draft).
    pub async fn create<'e, E>(executor: E, input: &CreateProject) -> Result<Project, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO proyectos
                (title, description, status_id, student_id, director_id, work_area_id, created_by)
             VALUES ($1, $2, COALESCE($3, 1), $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status_id)
            .bind(input.student_id)
            .bind(input.director_id)
            .bind(input.work_area_id)
            .bind(input.created_by)
            .fetch_one(executor)
            .await
    }

    /// Insert a project and make `creator_id` an active member in one
    /// transaction. `created_by` is always set to `creator_id`.
    pub async fn create_with_creator(
        pool: &PgPool,
        input: &CreateProject,
        creator_id: DbId,
        creator_role: ProjectRole,
    ) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let input = CreateProject {
            created_by: Some(creator_id),
            ..input.clone()
        };
        let project = Self::create(&mut *tx, &input).await?;

        ProjectMemberRepo::upsert_active(&mut tx, project.id, creator_id, creator_role).await?;

        tx.commit().await?;
        Ok(project)
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proyectos WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proyectos ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE proyectos SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status_id = COALESCE($4, status_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status_id)
            .fetch_optional(pool)
            .await
    }

    /// Reassign student, director and/or work area.
    ///
    /// Newly assigned owners are also given an active membership so the
    /// roster and the owner columns never disagree.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        input: &AssignProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE proyectos SET
                student_id = COALESCE($2, student_id),
                director_id = COALESCE($3, director_id),
                work_area_id = COALESCE($4, work_area_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.student_id)
            .bind(input.director_id)
            .bind(input.work_area_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(project) = project else {
            return Ok(None);
        };

        if let Some(student_id) = input.student_id {
            ProjectMemberRepo::upsert_active(&mut tx, project.id, student_id, ProjectRole::Student)
                .await?;
        }
        if let Some(director_id) = input.director_id {
            ProjectMemberRepo::upsert_active(&mut tx, project.id, director_id, ProjectRole::Director)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(project))
    }
}
