//! Storage error types.
//!
//! Provides error handling for key-value persistence using `thiserror`.

use thiserror::Error;

/// Storage-specific errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to open or create the backing database.
    #[error("failed to open store: {0}")]
    Open(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    Query(String),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error during storage operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
