//! Catalog retrieval from the remote feed, through the cache.

use crate::catalog::SiteCatalog;
use crate::error::{CatalogError, Result};
use spoor_cache::Cache;
use spoor_core::CatalogConfig;
use spoor_fetch::Fetcher;
use std::sync::Arc;
use tracing::{debug, warn};

/// Prefix of the cache keys holding raw catalog feeds.
pub const CATALOG_CACHE_KEY: &str = "site_catalog";

/// Cache key for the feed at `feed_url`.
///
/// Each feed URL gets its own entry, so changing `feed_url` never serves a
/// copy of the previous feed.
#[must_use]
pub fn catalog_cache_key(feed_url: &str) -> String {
    format!("{CATALOG_CACHE_KEY}:{}", feed_url.trim())
}

/// Loads the site catalog, preferring a cached copy of the feed.
pub struct CatalogSource {
    cache: Arc<dyn Cache>,
    fetcher: Arc<dyn Fetcher>,
    config: CatalogConfig,
    cache_key: String,
}

impl CatalogSource {
    /// Create a source reading through `cache` and falling back to `fetcher`.
    #[must_use]
    pub fn new(cache: Arc<dyn Cache>, fetcher: Arc<dyn Fetcher>, config: CatalogConfig) -> Self {
        let cache_key = catalog_cache_key(&config.feed_url);
        Self {
            cache,
            fetcher,
            config,
            cache_key,
        }
    }

    /// Load the catalog.
    ///
    /// A cached feed younger than `cache_hours` is used as is. Otherwise the
    /// feed is fetched, parsed, and only then written to the cache, so an
    /// unparsable download is never cached.
    ///
    /// # Errors
    /// Returns `CatalogError::Unreachable` if the feed cannot be fetched and
    /// `CatalogError::ParseError` if it cannot be parsed.
    pub async fn load(&self) -> Result<SiteCatalog> {
        if let Some(content) = self.cached_feed().await {
            match SiteCatalog::from_feed(&content) {
                Ok(catalog) => {
                    debug!("using cached site catalog");
                    return Ok(catalog);
                }
                Err(e) => {
                    warn!(error = %e, "cached site catalog is unreadable, refetching");
                    if let Err(e) = self.cache.invalidate(&self.cache_key).await {
                        warn!(error = %e, "failed to drop cached site catalog");
                    }
                }
            }
        }

        let url = &self.config.feed_url;
        let response = self.fetcher.fetch(url).await;
        let content = response
            .content()
            .ok_or_else(|| CatalogError::Unreachable { url: url.clone() })?;

        let catalog = SiteCatalog::from_feed(content)?;

        if let Err(e) = self.cache.put(&self.cache_key, content).await {
            warn!(error = %e, "failed to cache site catalog");
        }

        Ok(catalog)
    }

    async fn cached_feed(&self) -> Option<String> {
        match self
            .cache
            .get(&self.cache_key, self.config.max_age())
            .await
        {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "failed to read cached site catalog");
                None
            }
        }
    }
}
