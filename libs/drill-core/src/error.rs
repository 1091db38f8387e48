//! Error types for drill-core.

use crate::types::{ItemId, UserId};
use thiserror::Error;

/// Result type alias using SchedulerError.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors reported by a persistence or catalog collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("review state store unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Errors surfaced by the scheduler and session composer.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("review state of item {item_id} for user {user_id} kept changing ({attempts} attempts)")]
    Conflict {
        user_id: UserId,
        item_id: ItemId,
        attempts: u32,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("item not found in catalog: {0}")]
    UnknownItem(ItemId),
}

impl SchedulerError {
    /// Whether replaying the same grading event may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Conflict { .. } => true,
            Self::Store(err) => err.is_retryable(),
            Self::UnknownItem(_) => false,
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("similarity threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("daily reset hour must be 0-23, got {0}")]
    InvalidResetHour(u32),

    #[error("choice count must be between 2 and 6, got {0}")]
    InvalidChoiceCount(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_and_unavailable_are_retryable() {
        let conflict = SchedulerError::Conflict {
            user_id: 1,
            item_id: 2,
            attempts: 4,
        };
        assert!(conflict.is_retryable());
        assert!(SchedulerError::from(StoreError::Unavailable("locked".into())).is_retryable());
        assert!(!SchedulerError::from(StoreError::Backend("corrupt".into())).is_retryable());
        assert!(!SchedulerError::UnknownItem(9).is_retryable());
    }

    #[test]
    fn error_display() {
        let error = StoreError::Unavailable("database is locked".to_string());
        assert_eq!(error.to_string(), "review state store unavailable: database is locked");
        let error = SchedulerError::UnknownItem(42);
        assert_eq!(error.to_string(), "item not found in catalog: 42");
    }
}
