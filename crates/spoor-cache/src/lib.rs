//! Spoor Cache Layer
//!
//! Key/value storage with age-limited reads, backing both the site catalog
//! feed and the distrust calibration state.
//!
//! # Architecture
//!
//! - **Trait**: [`Cache`] is what the rest of the workspace consumes
//! - **Persistence**: [`SqliteCache`] stores entries in `SQLite` via `SQLx`
//! - **Migrations**: SQL migrations are embedded and versioned using `SQLx`
//! - **In-process**: [`MemoryCache`] for tests and runs that skip the disk
//!
//! # Example
//!
//! ```ignore
//! use spoor_cache::{Cache, SqliteCache};
//! use std::time::Duration;
//!
//! let cache = SqliteCache::open("cache.db").await?;
//! cache.put("site_catalog", &feed).await?;
//! let feed = cache.get("site_catalog", Duration::from_secs(48 * 3600)).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod migrations;
pub mod store;

// Re-export commonly used types
pub use connection::CachePool;
pub use error::{CacheError, Result};
pub use store::{Cache, MemoryCache, SqliteCache};
