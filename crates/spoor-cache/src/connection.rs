//! Cache database connection management.
//!
//! Provides a `CachePool` wrapper around `SQLx` that opens the on-disk cache
//! (creating parent directories and the file on first use) or a private
//! in-memory database for tests and `--no-cache` runs.

use crate::error::{CacheError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Connection pool for the cache database.
#[derive(Debug, Clone)]
pub struct CachePool {
    pool: Pool<Sqlite>,
}

impl CachePool {
    /// Open (or create) the cache database at `path`.
    ///
    /// # Errors
    /// Returns `CacheError` if:
    /// - The parent directory cannot be created
    /// - The path is not valid UTF-8
    /// - The database file cannot be opened
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| CacheError::Open("invalid cache path: not valid UTF-8".to_string()))?;

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| CacheError::Open(format!("invalid connection string: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| CacheError::Open(format!("failed to open cache pool: {e}")))?;

        tracing::info!("Cache database opened at {}", path_str);

        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// Each in-memory connection is its own database, so the pool is pinned
    /// to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(":memory:")
            .map_err(|e| CacheError::Open(format!("invalid connection string: {e}")))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await
            .map_err(|e| CacheError::Open(format!("failed to open in-memory cache: {e}")))?;

        Ok(Self { pool })
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::debug!("Cache database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_pool() {
        let pool = CachePool::in_memory().await.expect("open in-memory pool");
        sqlx::query("SELECT 1")
            .execute(pool.pool())
            .await
            .expect("query in-memory pool");
    }

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("nested").join("cache.db");

        let pool = CachePool::open(&path).await.expect("open cache pool");
        assert!(path.exists());

        pool.close().await;
    }
}
