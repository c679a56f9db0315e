//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Error reported by SQLite, including constraint violations.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The query could not be executed as given (bad cast, negative skip,
    /// unknown sort direction).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A stored row could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The connection can no longer be used.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The blocking task running the query panicked or was cancelled.
    #[error("store task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
