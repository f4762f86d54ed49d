//! Cache schema migrations.
//!
//! Embeds SQL migrations and applies them with `SQLx`'s migrator.

use crate::error::{CacheError, Result};
use sqlx::{Pool, Sqlite};

/// Run all pending cache migrations.
///
/// # Errors
/// Returns `CacheError::Migration` if any migration fails to execute.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    tracing::debug!("Running cache migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| CacheError::Migration(format!("migration execution failed: {e}")))?;

    Ok(())
}
