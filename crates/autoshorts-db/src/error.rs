//! Database error types.

use thiserror::Error;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Connection-level failures, as opposed to bad statements.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DbError::Query(sqlx::Error::Io(_))
                | DbError::Query(sqlx::Error::PoolTimedOut)
                | DbError::Query(sqlx::Error::PoolClosed)
        )
    }
}
