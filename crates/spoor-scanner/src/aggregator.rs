//! Collection of probe outcomes for one scan.

use crate::evaluator::ProbeOutcome;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Probe outcomes of a single scan, keyed by label.
///
/// Owned by one scan; workers never touch it directly but send outcomes
/// over a channel to [`ResultAggregator::collect`].
#[derive(Debug, Default)]
pub struct ResultAggregator {
    outcomes: HashMap<String, ProbeOutcome>,
}

impl ResultAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain `receiver` until every sender is dropped.
    pub async fn collect(mut receiver: mpsc::UnboundedReceiver<ProbeOutcome>) -> Self {
        let mut aggregator = Self::new();
        while let Some(outcome) = receiver.recv().await {
            aggregator.record(outcome);
        }
        aggregator
    }

    /// Record one outcome. The first outcome for a label wins.
    pub fn record(&mut self, outcome: ProbeOutcome) {
        if self.outcomes.contains_key(&outcome.label) {
            tracing::warn!(label = %outcome.label, "duplicate probe outcome ignored");
            return;
        }
        self.outcomes.insert(outcome.label.clone(), outcome);
    }

    /// Number of recorded outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// All outcomes, in no particular order.
    #[must_use]
    pub fn into_outcomes(self) -> Vec<ProbeOutcome> {
        self.outcomes.into_values().collect()
    }

    /// Labels of the outcomes that found an account.
    #[must_use]
    pub fn matched_labels(&self) -> Vec<String> {
        self.outcomes
            .values()
            .filter(|outcome| outcome.found)
            .map(|outcome| outcome.label.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(label: &str, found: bool) -> ProbeOutcome {
        ProbeOutcome {
            label: label.to_string(),
            site_name: label.to_string(),
            found,
        }
    }

    #[test]
    fn test_matched_labels_only_found() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(outcome("a", true));
        aggregator.record(outcome("b", false));
        aggregator.record(outcome("c", true));

        let mut labels = aggregator.matched_labels();
        labels.sort();
        assert_eq!(labels, vec!["a", "c"]);
        assert_eq!(aggregator.len(), 3);
    }

    #[test]
    fn test_label_recorded_once() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(outcome("a", false));
        aggregator.record(outcome("a", true));

        assert_eq!(aggregator.len(), 1);
        assert!(aggregator.matched_labels().is_empty());
    }

    #[tokio::test]
    async fn test_collect_drains_all_senders() {
        let (tx, rx) = mpsc::unbounded_channel();
        let collector = tokio::spawn(ResultAggregator::collect(rx));

        let senders: Vec<_> = (0..4)
            .map(|i| {
                let tx = tx.clone();
                tokio::spawn(async move {
                    for j in 0..10 {
                        tx.send(outcome(&format!("site-{i}-{j}"), j % 2 == 0))
                            .expect("collector alive");
                    }
                })
            })
            .collect();
        drop(tx);

        for sender in senders {
            sender.await.expect("sender task");
        }
        let aggregator = collector.await.expect("collector task");

        assert_eq!(aggregator.len(), 40);
        assert_eq!(aggregator.matched_labels().len(), 20);
    }
}
