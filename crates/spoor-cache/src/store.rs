//! The `Cache` trait and its two stores.
//!
//! Entries are written with their insertion time; readers decide validity by
//! passing the maximum age they accept, so one entry can serve callers with
//! different freshness needs.

use crate::connection::CachePool;
use crate::error::{CacheError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// Key/value cache with age-limited reads.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch `key` if it was stored less than `max_age` ago.
    async fn get(&self, key: &str, max_age: Duration) -> Result<Option<String>>;

    /// Store `content` under `key`, replacing any previous entry.
    async fn put(&self, key: &str, content: &str) -> Result<()>;

    /// Drop `key` regardless of its age.
    async fn invalidate(&self, key: &str) -> Result<()>;
}

fn is_fresh(stored_at: DateTime<Utc>, max_age: Duration) -> bool {
    // Entries stamped in the future (clock skew) count as brand new.
    let age = (Utc::now() - stored_at).to_std().unwrap_or_default();
    age <= max_age
}

/// Cache persisted in SQLite, surviving process restarts.
#[derive(Debug, Clone)]
pub struct SqliteCache {
    pool: CachePool,
}

impl SqliteCache {
    /// Wrap an open pool, applying migrations first.
    pub async fn new(pool: CachePool) -> Result<Self> {
        crate::migrations::run_migrations(pool.pool()).await?;
        Ok(Self { pool })
    }

    /// Open the on-disk cache at `path`.
    pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::new(CachePool::open(path).await?).await
    }

    /// Open a throwaway in-memory cache.
    pub async fn in_memory() -> Result<Self> {
        Self::new(CachePool::in_memory().await?).await
    }

    async fn put_at(&self, key: &str, content: &str, stored_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO cache_entries (key, content, stored_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                content = excluded.content,
                stored_at = excluded.stored_at
            ",
        )
        .bind(key)
        .bind(content)
        .bind(stored_at.to_rfc3339())
        .execute(self.pool.pool())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Cache for SqliteCache {
    async fn get(&self, key: &str, max_age: Duration) -> Result<Option<String>> {
        let row: Option<(String, String)> = sqlx::query_as(
            r"
            SELECT content, stored_at
            FROM cache_entries
            WHERE key = ?
            ",
        )
        .bind(key)
        .fetch_optional(self.pool.pool())
        .await?;

        let Some((content, stored_at)) = row else {
            return Ok(None);
        };

        let stored_at = DateTime::parse_from_rfc3339(&stored_at)
            .map_err(|e| CacheError::Decode(format!("invalid stored_at for '{key}': {e}")))?
            .with_timezone(&Utc);

        if is_fresh(stored_at, max_age) {
            Ok(Some(content))
        } else {
            tracing::debug!(key, stored_at = %stored_at, "cache entry expired");
            Ok(None)
        }
    }

    async fn put(&self, key: &str, content: &str) -> Result<()> {
        self.put_at(key, content, Utc::now()).await
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM cache_entries WHERE key = ?")
            .bind(key)
            .execute(self.pool.pool())
            .await?;

        Ok(())
    }
}

/// Process-local cache, for tests and runs that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (DateTime<Utc>, String)>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, fresh or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("acquire read lock on cache entries")
            .len()
    }

    /// Whether nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn put_at(&self, key: &str, content: &str, stored_at: DateTime<Utc>) {
        self.entries
            .write()
            .expect("acquire write lock on cache entries")
            .insert(key.to_string(), (stored_at, content.to_string()));
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str, max_age: Duration) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .expect("acquire read lock on cache entries");

        Ok(entries
            .get(key)
            .filter(|(stored_at, _)| is_fresh(*stored_at, max_age))
            .map(|(_, content)| content.clone()))
    }

    async fn put(&self, key: &str, content: &str) -> Result<()> {
        self.put_at(key, content, Utc::now());
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        self.entries
            .write()
            .expect("acquire write lock on cache entries")
            .remove(key);
        Ok(())
    }
}
