//! Probe engine for scanning a catalog with a bounded worker pool.
//!
//! Every scan owns its own work queue and result collector, so one engine
//! can serve several identifiers, even concurrently, without cross-talk.

use crate::aggregator::ResultAggregator;
use crate::evaluator::{MatchEvaluator, ProbeOutcome};
use futures::future::join_all;
use spoor_catalog::{SiteCatalog, SiteDefinition};
use spoor_core::Identifier;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

/// Default number of probe workers.
pub const DEFAULT_MAX_WORKERS: usize = 50;

/// Shared queue of sites still to probe.
type WorkQueue = Arc<Mutex<VecDeque<Arc<SiteDefinition>>>>;

/// Outcomes and timing of one scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Identifier that was probed
    pub identifier: Identifier,
    /// One outcome per probed site, in no particular order
    pub outcomes: Vec<ProbeOutcome>,
    /// Number of sites dispatched
    pub probed: usize,
    /// Wall-clock duration of the scan
    pub elapsed: Duration,
}

impl ScanReport {
    /// Outcomes that found an account.
    pub fn found(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.found)
    }

    /// Labels of the outcomes that found an account.
    #[must_use]
    pub fn matched_labels(&self) -> Vec<String> {
        self.found().map(|outcome| outcome.label.clone()).collect()
    }

    /// Sites probed per second.
    #[must_use]
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            #[allow(clippy::cast_precision_loss)]
            let probed = self.probed as f64;
            probed / secs
        } else {
            0.0
        }
    }
}

/// Runs a [`MatchEvaluator`] across a catalog with bounded concurrency.
#[derive(Clone)]
pub struct ProbeEngine {
    evaluator: Arc<MatchEvaluator>,
    max_workers: usize,
}

impl ProbeEngine {
    /// Create an engine with the default worker limit.
    #[must_use]
    pub fn new(evaluator: Arc<MatchEvaluator>) -> Self {
        Self {
            evaluator,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }

    /// Set the maximum number of probes in flight. Zero is treated as one.
    #[must_use]
    pub fn with_max_workers(mut self, max: usize) -> Self {
        self.max_workers = max.max(1);
        self
    }

    /// Number of workers a scan over `site_count` sites will spawn.
    #[must_use]
    pub fn worker_count(&self, site_count: usize) -> usize {
        site_count.min(self.max_workers)
    }

    /// Probe every site in `catalog` and return the labels that matched.
    ///
    /// Label order is unspecified.
    pub async fn scan(&self, identifier: &Identifier, catalog: &SiteCatalog) -> Vec<String> {
        self.scan_report(identifier, catalog).await.matched_labels()
    }

    /// Probe every site in `catalog`, returning every outcome with timing.
    ///
    /// Workers pull sites from a shared queue until it is empty and send
    /// outcomes to a single collector; the scan returns once every worker
    /// has finished. There is no early exit: each dispatched probe runs to
    /// completion or to its fetch timeout.
    pub async fn scan_report(&self, identifier: &Identifier, catalog: &SiteCatalog) -> ScanReport {
        let started = Instant::now();
        let probed = catalog.len();

        let queue: WorkQueue = Arc::new(Mutex::new(catalog.sites().iter().cloned().collect()));
        let (tx, rx) = mpsc::unbounded_channel();

        let workers: Vec<_> = (0..self.worker_count(probed))
            .map(|worker| {
                let queue = queue.clone();
                let tx = tx.clone();
                let evaluator = self.evaluator.clone();
                let identifier = identifier.clone();

                tokio::spawn(async move {
                    while let Some(site) = next_site(&queue) {
                        let outcome = evaluator.probe(&identifier, &site).await;
                        if tx.send(outcome).is_err() {
                            break;
                        }
                    }
                    debug!(worker, "probe worker finished");
                })
            })
            .collect();

        // Only the workers' clones may keep the collector running.
        drop(tx);

        let (joined, aggregator) = tokio::join!(join_all(workers), ResultAggregator::collect(rx));

        for result in joined {
            if let Err(e) = result {
                debug!(error = %e, "probe worker exited abnormally");
            }
        }

        let report = ScanReport {
            identifier: identifier.clone(),
            outcomes: aggregator.into_outcomes(),
            probed,
            elapsed: started.elapsed(),
        };

        debug!(
            name = %identifier,
            count = report.outcomes.len(),
            duration_secs = report.elapsed.as_secs_f64(),
            rate = report.rate(),
            "scan statistics"
        );

        report
    }
}

fn next_site(queue: &WorkQueue) -> Option<Arc<SiteDefinition>> {
    queue.lock().expect("acquire probe queue lock").pop_front()
}
