//! Error types for the catalog subsystem.

use thiserror::Error;

/// Errors that make a site catalog unavailable.
///
/// Any of these is fatal for the finder that owns the catalog: a partial
/// catalog is never used.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The feed could not be fetched
    #[error("unable to fetch site catalog from {url}")]
    Unreachable {
        /// Feed URL that returned no content
        url: String,
    },

    /// The feed is not valid JSON or does not match the expected shape
    #[error("unable to parse site catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The feed parsed but holds no valid, probeable entry
    #[error("site catalog has no usable sites ({total} entries)")]
    NoUsableSites {
        /// Number of entries in the feed
        total: usize,
    },
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
