//! Spoor Scanner - Account probing, calibration and event handling.
//!
//! This crate checks a username against every site in the catalog and
//! reports where it appears to hold an account. Probes run on a bounded
//! pool of tokio workers; each response is judged by the site's expected
//! status and text plus two heuristics against sites that echo any name.
//!
//! # Features
//!
//! - Bounded-concurrency scans with a drained work queue
//! - Per-site match evaluation with identifier-mention and punctuation checks
//! - Distrust calibration against a random identifier, cached between runs
//! - Username derivation from e-mail addresses, names and domains
//!
//! # Example
//!
//! ```rust,ignore
//! use spoor_scanner::{AccountFinder, MODULE_NAME};
//! use spoor_core::{AppConfig, EventKind, FinderEvent};
//! use std::sync::Arc;
//!
//! let mut finder = AccountFinder::setup(&config, cache, fetcher, feed_fetcher).await?;
//! let event = Arc::new(FinderEvent::new(EventKind::Username, "jdoe", "cli"));
//!
//! for found in finder.handle_event(event).await {
//!     println!("{}", found.data);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod aggregator;
pub mod calibration;
pub mod engine;
#[allow(missing_docs)]
pub mod error;
pub mod evaluator;
pub mod finder;
pub mod identifiers;

// Re-export commonly used types
pub use aggregator::ResultAggregator;
pub use calibration::{
    calibration_identifier, Calibration, DistrustState, TrustCalibrator, DISTRUST_CACHE_KEY,
};
pub use engine::{ProbeEngine, ScanReport, DEFAULT_MAX_WORKERS};
pub use error::{CalibrationError, Result, ScanError};
pub use evaluator::{evaluate, MatchEvaluator, ProbeOutcome};
pub use finder::{AccountFinder, CatalogState, MODULE_NAME};
pub use identifiers::{domain_keyword, IdentifierDeriver};
