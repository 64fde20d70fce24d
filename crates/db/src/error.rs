use gestion_core::error::CoreError;

/// Error returned by repository operations that enforce domain rules
/// inside a transaction (invitation acceptance, deliverable transitions).
///
/// Plain CRUD methods return `sqlx::Error` directly.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
