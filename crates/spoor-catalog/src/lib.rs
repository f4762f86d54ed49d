//! Spoor Catalog - Site definitions for account discovery.
//!
//! This crate holds the catalog of external sites that can be probed for an
//! account: parsing the JSON feed, keeping the usable entries, filtering out
//! distrusted sites, and retrieving the feed through the cache.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): one site's probe URL and match expectations
//! - **Catalog** ([`catalog`]): the ordered, shareable set of usable definitions
//! - **Source** ([`source`]): feed retrieval through the cache
//! - **Errors** ([`error`]): catalog-level failures
//!
//! # Example
//!
//! ```rust
//! use spoor_catalog::SiteCatalog;
//! use std::collections::HashSet;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let feed = r#"{"sites": [{"name": "GitHub", "category": "coding",
//!     "check_uri": "https://github.com/{account}", "valid": true,
//!     "account_existence_code": "200", "account_existence_string": "Repositories"}]}"#;
//!
//! let catalog = SiteCatalog::from_feed(feed)?;
//! let trusted = catalog.filter(&HashSet::from(["GitHub".to_string()]));
//!
//! assert_eq!(catalog.len(), 1);
//! assert!(trusted.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod catalog;
pub mod definition;
pub mod error;
pub mod source;

// Re-export commonly used types
pub use catalog::SiteCatalog;
pub use definition::{SiteDefinition, ACCOUNT_PLACEHOLDER};
pub use error::{CatalogError, Result};
pub use source::{catalog_cache_key, CatalogSource, CATALOG_CACHE_KEY};
