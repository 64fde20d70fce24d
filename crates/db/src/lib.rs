//! Persistence layer: connection pool, migrations, row models and repositories.

pub mod access;
pub mod error;
pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub use error::DbError;

pub type DbPool = sqlx::PgPool;

/// Default pool size when `DB_MAX_CONNECTIONS` is not set.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// PostgreSQL SQLSTATE codes for DDL that targets something which already exists.
const BENIGN_SCHEMA_CODES: &[&str] = &[
    "42701", // duplicate_column
    "42P07", // duplicate_table (also covers indexes)
    "42710", // duplicate_object (constraints, triggers)
];

/// Whether `err` only says that a column, table, index or constraint already exists.
///
/// Re-running schema repairs hits these; callers log them and carry on.
pub fn is_benign_schema_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| BENIGN_SCHEMA_CODES.contains(&&*code)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_benign() {
        assert!(!is_benign_schema_error(&sqlx::Error::RowNotFound));
        assert!(!is_benign_schema_error(&sqlx::Error::PoolTimedOut));
    }
}
