//! Event-driven account finder.
//!
//! [`AccountFinder`] consumes identity events (e-mail addresses, names,
//! domains, usernames), emits the usernames it derives from them, and
//! reports every site where a username appears to hold an account.

use crate::calibration::TrustCalibrator;
use crate::engine::ProbeEngine;
use crate::error::Result;
use crate::evaluator::MatchEvaluator;
use crate::identifiers::IdentifierDeriver;
use spoor_cache::Cache;
use spoor_catalog::{CatalogSource, SiteCatalog};
use spoor_core::{AppConfig, EventKind, FinderEvent, Identifier};
use spoor_fetch::Fetcher;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Module name stamped on every event the finder emits.
pub const MODULE_NAME: &str = "spoor_accounts";

/// Whether the site catalog is available.
#[derive(Debug, Clone)]
pub enum CatalogState {
    /// Catalog loaded
    Ready(SiteCatalog),
    /// Catalog could not be loaded; the reason is kept for reporting
    Failed(String),
}

impl CatalogState {
    /// Load the catalog from `source`, logging a failure once.
    pub async fn load(source: &CatalogSource) -> Self {
        match source.load().await {
            Ok(catalog) => Self::Ready(catalog),
            Err(e) => {
                error!(error = %e, "failed to load site catalog");
                Self::Failed(e.to_string())
            }
        }
    }

    /// The catalog, if loaded.
    #[must_use]
    pub fn catalog(&self) -> Option<&SiteCatalog> {
        match self {
            Self::Ready(catalog) => Some(catalog),
            Self::Failed(_) => None,
        }
    }
}

/// Turns identity events into username and external account events.
///
/// One finder serves one session: it remembers which event values it has
/// handled and which usernames it has reported, and calibrates site trust
/// on the first event it handles.
pub struct AccountFinder {
    engine: ProbeEngine,
    calibrator: Option<TrustCalibrator>,
    catalog: CatalogState,
    deriver: IdentifierDeriver,
    distrusted: BTreeSet<String>,
    seen: HashSet<String>,
    reported: HashSet<String>,
    calibrated: bool,
}

impl AccountFinder {
    /// Build a finder from configuration.
    ///
    /// The catalog is loaded here through `feed_fetcher`; probes go through
    /// `fetcher`. If loading fails the finder is still returned, in a failed
    /// state where it handles no events.
    ///
    /// # Errors
    /// Returns `ScanError::Dictionary` if a configured dictionary cannot be read.
    pub async fn setup(
        config: &AppConfig,
        cache: Arc<dyn Cache>,
        fetcher: Arc<dyn Fetcher>,
        feed_fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self> {
        let deriver = IdentifierDeriver::from_config(&config.identifiers)?;

        let source = CatalogSource::new(cache.clone(), feed_fetcher, config.catalog.clone());
        let catalog = CatalogState::load(&source).await;

        let evaluator = Arc::new(MatchEvaluator::new(
            fetcher,
            config.probing.must_mention_identifier,
        ));
        let engine = ProbeEngine::new(evaluator).with_max_workers(config.probing.max_workers);

        let calibrator = config
            .calibration
            .enabled
            .then(|| TrustCalibrator::new(cache, config.calibration.max_age()));

        Ok(Self::new(engine, catalog, deriver, calibrator))
    }

    /// Assemble a finder from its parts.
    #[must_use]
    pub fn new(
        engine: ProbeEngine,
        catalog: CatalogState,
        deriver: IdentifierDeriver,
        calibrator: Option<TrustCalibrator>,
    ) -> Self {
        Self {
            engine,
            calibrator,
            catalog,
            deriver,
            distrusted: BTreeSet::new(),
            seen: HashSet::new(),
            reported: HashSet::new(),
            calibrated: false,
        }
    }

    /// Whether the catalog failed to load.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.catalog, CatalogState::Failed(_))
    }

    /// The catalog currently probed, after any calibration.
    #[must_use]
    pub fn catalog(&self) -> Option<&SiteCatalog> {
        self.catalog.catalog()
    }

    /// Sites removed by calibration.
    #[must_use]
    pub fn distrusted(&self) -> &BTreeSet<String> {
        &self.distrusted
    }

    /// Calibrate site trust, at most once per finder.
    ///
    /// Does nothing when calibration is disabled or has already run.
    ///
    /// # Errors
    /// Returns `ScanError::Calibration` if the catalog is unavailable.
    pub async fn calibrate(&mut self) -> Result<()> {
        if self.calibrated {
            return Ok(());
        }
        self.calibrated = true;

        let Some(calibrator) = &self.calibrator else {
            debug!("site trust calibration disabled");
            return Ok(());
        };

        let calibration = calibrator.calibrate(&self.engine, &self.catalog).await?;
        self.distrusted = calibration.distrusted;
        self.catalog = CatalogState::Ready(calibration.catalog);
        Ok(())
    }

    /// Probe the current catalog for `identifier`, returning matched labels
    /// in sorted order.
    pub async fn scan(&self, identifier: &Identifier) -> Vec<String> {
        let Some(catalog) = self.catalog.catalog() else {
            return Vec::new();
        };

        let mut labels = self.engine.scan(identifier, catalog).await;
        labels.sort();
        labels
    }

    /// Handle one incoming event and return the events it produces.
    ///
    /// Emits a `USERNAME` event for each new candidate derived from the
    /// event, and for `USERNAME` events that pass filtering, one
    /// `ACCOUNT_EXTERNAL_OWNED` event per matching site.
    pub async fn handle_event(&mut self, event: Arc<FinderEvent>) -> Vec<FinderEvent> {
        if self.is_failed() {
            return Vec::new();
        }

        debug!(kind = %event.kind, module = %event.module, "received event");

        if event.kind != EventKind::Username && event.module == MODULE_NAME {
            debug!(kind = %event.kind, "ignoring own event");
            return Vec::new();
        }

        if !self.seen.insert(event.data.clone()) {
            return Vec::new();
        }

        if !self.calibrated {
            if let Err(e) = self.calibrate().await {
                warn!(error = %e, "site trust calibration skipped");
            }
        }

        let mut emitted = Vec::new();
        let mut probe = None;

        for candidate in self.deriver.derive(event.kind, &event.data) {
            if !self.deriver.accept(&candidate) {
                continue;
            }

            if candidate == event.data {
                if event.kind == EventKind::Username {
                    probe = Some(candidate);
                }
                continue;
            }

            if self.reported.insert(candidate.clone()) {
                emitted.push(FinderEvent::derived(
                    EventKind::Username,
                    candidate,
                    MODULE_NAME,
                    event.clone(),
                ));
            }
        }

        if let Some(candidate) = probe {
            match Identifier::new(candidate.as_str()) {
                Ok(identifier) => {
                    let labels = self.scan(&identifier).await;
                    info!(name = %identifier, found = labels.len(), "account probe finished");

                    emitted.extend(labels.into_iter().map(|label| {
                        FinderEvent::derived(
                            EventKind::AccountExternalOwned,
                            label,
                            MODULE_NAME,
                            event.clone(),
                        )
                    }));
                }
                Err(e) => warn!(candidate = %candidate, error = %e, "skipping unprobeable username"),
            }
        }

        emitted
    }
}
