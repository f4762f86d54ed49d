//! The probeable site catalog.

use crate::definition::{Feed, SiteDefinition};
use crate::error::{CatalogError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Ordered, immutable set of usable site definitions.
///
/// Cloning is cheap: definitions are shared, so a filtered catalog and the
/// catalog it came from point at the same entries.
#[derive(Debug, Clone, Default)]
pub struct SiteCatalog {
    sites: Vec<Arc<SiteDefinition>>,
}

impl SiteCatalog {
    /// Build a catalog from already loaded definitions, keeping usable ones.
    #[must_use]
    pub fn new(definitions: impl IntoIterator<Item = SiteDefinition>) -> Self {
        Self {
            sites: definitions
                .into_iter()
                .filter(|def| def.usable)
                .map(Arc::new)
                .collect(),
        }
    }

    /// Parse a raw JSON feed, keeping only entries flagged `valid`.
    ///
    /// # Errors
    /// Returns `CatalogError::ParseError` if the feed is not JSON or has no
    /// `sites` array, and `CatalogError::NoUsableSites` if no entry survives.
    /// No partial catalog is ever returned.
    pub fn from_feed(raw: &str) -> Result<Self> {
        let feed: Feed = serde_json::from_str(raw)?;
        let total = feed.sites.len();

        let catalog = Self::new(
            feed.sites
                .into_iter()
                .filter_map(crate::definition::FeedEntry::into_definition),
        );

        if catalog.is_empty() {
            return Err(CatalogError::NoUsableSites { total });
        }

        info!(
            total,
            usable = catalog.len(),
            "loaded site catalog"
        );

        Ok(catalog)
    }

    /// A new catalog without the sites named in `excluded`.
    #[must_use]
    pub fn filter(&self, excluded: &HashSet<String>) -> Self {
        Self {
            sites: self
                .sites
                .iter()
                .filter(|def| !excluded.contains(&def.name))
                .cloned()
                .collect(),
        }
    }

    /// Definitions in feed order.
    #[must_use]
    pub fn sites(&self) -> &[Arc<SiteDefinition>] {
        &self.sites
    }

    /// Site names in feed order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.sites.iter().map(|def| def.name.as_str()).collect()
    }

    /// Number of sites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the catalog has no sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
