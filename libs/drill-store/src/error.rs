//! Database error types.

use drill_core::error::StoreError;
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl DbError {
    /// Lock contention that may clear up on retry.
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Sqlite(err) => matches!(
                err.sqlite_error_code(),
                Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            ),
            _ => false,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        if err.is_busy() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(code: i32) -> DbError {
        DbError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(code),
            None,
        ))
    }

    #[test]
    fn busy_database_is_unavailable() {
        let err: StoreError = sqlite_failure(rusqlite::ffi::SQLITE_BUSY).into();
        assert!(err.is_retryable());
        let err: StoreError = sqlite_failure(rusqlite::ffi::SQLITE_LOCKED).into();
        assert!(err.is_retryable());
    }

    #[test]
    fn other_failures_are_backend_errors() {
        let err: StoreError = sqlite_failure(rusqlite::ffi::SQLITE_CORRUPT).into();
        assert!(matches!(err, StoreError::Backend(_)));

        let err: StoreError = DbError::InvalidData("bad stage".to_string()).into();
        assert_eq!(err.to_string(), "storage backend error: invalid data: bad stage");
    }
}
