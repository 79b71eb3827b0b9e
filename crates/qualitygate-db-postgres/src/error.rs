//! Error types for the PostgreSQL storage backend.

use qualitygate_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// PostgreSQL error code for undefined table.
const PG_UNDEFINED_TABLE: &str = "42P01";

fn is_undefined_table(err: &SqlxError) -> bool {
    matches!(err, SqlxError::Database(db_err) if db_err.code().as_deref() == Some(PG_UNDEFINED_TABLE))
}

/// Maps a query failure onto the backend-neutral error type.
///
/// Transport and pool failures become `ConnectionError`; everything else the
/// server reported becomes `Internal` with the database message attached.
pub(crate) fn query_error(err: SqlxError) -> StorageError {
    match &err {
        SqlxError::Io(_)
        | SqlxError::Tls(_)
        | SqlxError::PoolTimedOut
        | SqlxError::PoolClosed
        | SqlxError::WorkerCrashed => StorageError::connection_error(err.to_string()),
        SqlxError::Database(db_err) if is_undefined_table(&err) => StorageError::internal(
            format!("Schema is missing, were migrations run? ({})", db_err.message()),
        ),
        _ => StorageError::internal(format!("Database error: {err}")),
    }
}

/// Errors specific to the PostgreSQL storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx_core::error::Error),

    /// Embedded migration failed.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) => StorageError::connection_error(e.to_string()),
            PostgresError::Migration(e) => StorageError::internal(format!("Migration error: {e}")),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PostgresError::config("invalid URL");
        assert!(err.to_string().contains("Configuration error"));

        let err = PostgresError::Migration("checksum mismatch".into());
        assert_eq!(err.to_string(), "Migration error: checksum mismatch");
    }

    #[test]
    fn test_conversion_to_storage_error() {
        let pg_err = PostgresError::config("test error");
        let storage_err: StorageError = pg_err.into();
        assert!(matches!(storage_err, StorageError::Internal { .. }));
    }

    #[test]
    fn test_query_error_classification() {
        assert!(matches!(
            query_error(SqlxError::PoolTimedOut),
            StorageError::ConnectionError { .. }
        ));
        assert!(matches!(
            query_error(SqlxError::RowNotFound),
            StorageError::Internal { .. }
        ));
    }
}
