//! Spoor Core - Foundation crate for the Spoor account finder.
//!
//! This crate provides shared types, error handling and configuration
//! management that all other Spoor crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`Identifier`, `EventKind`, `FinderEvent`)
//!
//! # Example
//!
//! ```rust
//! use spoor_core::{AppConfig, Identifier};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let identifier = Identifier::new("bob.abc")?;
//!
//! assert_eq!(identifier.dotted_prefix(), Some("bob"));
//! assert!(config.probing.max_workers > 0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, CacheConfig, CalibrationConfig, CatalogConfig, IdentifierConfig, ProbingConfig,
    DEFAULT_FEED_URL,
};
pub use error::{ConfigError, ConfigResult, Result, SpoorError};
pub use types::{EventKind, FinderEvent, Identifier};
