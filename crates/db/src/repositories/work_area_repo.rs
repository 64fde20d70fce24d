//! Repository for the `areas_trabajo` table.

use gestion_core::types::DbId;
use sqlx::PgPool;

use crate::models::work_area::{CreateWorkArea, WorkArea};

const COLUMNS: &str = "id, name, description, created_at, updated_at";

pub struct WorkAreaRepo;

impl WorkAreaRepo {
    pub async fn create(pool: &PgPool, input: &CreateWorkArea) -> Result<WorkArea, sqlx::Error> {
        let query = format!(
            "INSERT INTO areas_trabajo (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkArea>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WorkArea>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM areas_trabajo WHERE id = $1");
        sqlx::query_as::<_, WorkArea>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all areas alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<WorkArea>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM areas_trabajo ORDER BY name ASC");
        sqlx::query_as::<_, WorkArea>(&query).fetch_all(pool).await
    }
}
