//! Distrust calibration.
//!
//! Some sites answer every profile URL with a page that passes their match
//! rules. Probing an identifier that cannot exist exposes them: any site
//! that reports it as found is distrusted and left out of real scans. The
//! result is cached so calibration runs once per validity window, not once
//! per process.

use crate::engine::ProbeEngine;
use crate::error::CalibrationError;
use crate::finder::CatalogState;
use rand::{rngs::OsRng, Rng};
use spoor_cache::Cache;
use spoor_catalog::SiteCatalog;
use spoor_core::Identifier;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cache key holding the distrusted site names.
pub const DISTRUST_CACHE_KEY: &str = "distrust_state";

/// Length of the synthetic calibration identifier.
pub const CALIBRATION_ID_LENGTH: usize = 10;

const CALIBRATION_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz1234567890";

/// What the cache says about calibration.
///
/// An empty `Calibrated` set means calibration ran and trusted every site;
/// it is stored as `[]`, which is distinct from no entry at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistrustState {
    /// No valid calibration result is cached
    Uncalibrated,
    /// Calibration ran; these sites are distrusted
    Calibrated(BTreeSet<String>),
}

impl DistrustState {
    /// Serialize a distrust set for the cache.
    pub fn encode(distrusted: &BTreeSet<String>) -> serde_json::Result<String> {
        serde_json::to_string(distrusted)
    }

    /// Parse cached content; unreadable content counts as uncalibrated.
    #[must_use]
    pub fn decode(content: Option<&str>) -> Self {
        let Some(content) = content else {
            return Self::Uncalibrated;
        };

        match serde_json::from_str::<BTreeSet<String>>(content) {
            Ok(distrusted) => Self::Calibrated(distrusted),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable distrust state");
                Self::Uncalibrated
            }
        }
    }
}

/// Result of applying calibration to a catalog.
#[derive(Debug, Clone)]
pub struct Calibration {
    /// Names of distrusted sites
    pub distrusted: BTreeSet<String>,
    /// The catalog without distrusted sites
    pub catalog: SiteCatalog,
    /// Whether the distrust set came from the cache
    pub from_cache: bool,
}

/// Finds and remembers sites that report accounts that do not exist.
pub struct TrustCalibrator {
    cache: Arc<dyn Cache>,
    max_age: Duration,
}

impl TrustCalibrator {
    /// Create a calibrator storing its result in `cache` for `max_age`.
    #[must_use]
    pub fn new(cache: Arc<dyn Cache>, max_age: Duration) -> Self {
        Self { cache, max_age }
    }

    /// Read the cached distrust state.
    ///
    /// Cache failures are logged and treated as a miss.
    pub async fn cached_state(&self) -> DistrustState {
        match self.cache.get(DISTRUST_CACHE_KEY, self.max_age).await {
            Ok(content) => DistrustState::decode(content.as_deref()),
            Err(e) => {
                warn!(error = %e, "failed to read distrust state");
                DistrustState::Uncalibrated
            }
        }
    }

    /// Prune distrusted sites from `catalog`, calibrating first if the cache
    /// holds no valid result.
    ///
    /// A calibration round probes the full catalog with a random identifier
    /// and distrusts every site that reports it found. Nothing is cached
    /// when the catalog is unavailable or empty.
    ///
    /// # Errors
    /// Returns `CalibrationError::CatalogUnavailable` if `catalog` failed to load.
    pub async fn calibrate(
        &self,
        engine: &ProbeEngine,
        catalog: &CatalogState,
    ) -> Result<Calibration, CalibrationError> {
        let catalog = match catalog {
            CatalogState::Ready(catalog) => catalog,
            CatalogState::Failed(reason) => {
                return Err(CalibrationError::CatalogUnavailable {
                    reason: reason.clone(),
                })
            }
        };

        if catalog.is_empty() {
            warn!("site catalog is empty, calibration result not cached");
            return Ok(Calibration {
                distrusted: BTreeSet::new(),
                catalog: catalog.clone(),
                from_cache: false,
            });
        }

        if let DistrustState::Calibrated(distrusted) = self.cached_state().await {
            debug!(distrusted = distrusted.len(), "using cached distrust state");
            return Ok(Calibration {
                catalog: prune(catalog, &distrusted),
                distrusted,
                from_cache: true,
            });
        }

        let identifier = calibration_identifier();
        info!(sites = catalog.len(), "calibrating site trust");

        let report = engine.scan_report(&identifier, catalog).await;
        let distrusted: BTreeSet<String> =
            report.found().map(|outcome| outcome.site_name.clone()).collect();

        for site in &distrusted {
            debug!(site = %site, "distrusting site");
        }

        match DistrustState::encode(&distrusted) {
            Ok(content) => {
                if let Err(e) = self.cache.put(DISTRUST_CACHE_KEY, &content).await {
                    warn!(error = %e, "failed to cache distrust state");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode distrust state"),
        }

        info!(distrusted = distrusted.len(), "site trust calibrated");

        Ok(Calibration {
            catalog: prune(catalog, &distrusted),
            distrusted,
            from_cache: false,
        })
    }
}

fn prune(catalog: &SiteCatalog, distrusted: &BTreeSet<String>) -> SiteCatalog {
    let excluded: HashSet<String> = distrusted.iter().cloned().collect();
    catalog.filter(&excluded)
}

/// Random lowercase alphanumeric identifier from the OS CSPRNG.
///
/// Ten characters over a 36-symbol alphabet make a collision with a real
/// account vanishingly unlikely and the value unpredictable to a site.
#[must_use]
pub fn calibration_identifier() -> Identifier {
    let mut rng = OsRng;
    let value: String = (0..CALIBRATION_ID_LENGTH)
        .map(|_| char::from(CALIBRATION_ALPHABET[rng.gen_range(0..CALIBRATION_ALPHABET.len())]))
        .collect();

    Identifier::new(value).expect("alphanumeric identifier is valid")
}
