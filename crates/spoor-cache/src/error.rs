//! Cache error types.
//!
//! Provides error handling for cache storage operations using `thiserror`.

use thiserror::Error;

/// Cache-specific errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to open or create the cache database.
    #[error("failed to open cache database: {0}")]
    Open(String),

    /// Migration execution failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Failed to decode a stored value.
    #[error("decode error: {0}")]
    Decode(String),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error while preparing the cache location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
