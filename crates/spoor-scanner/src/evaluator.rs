//! Per-site match evaluation.
//!
//! A probe fetches one site's check URL for one identifier and decides
//! whether the response shows an existing account.

use serde::Serialize;
use spoor_catalog::SiteDefinition;
use spoor_core::Identifier;
use spoor_fetch::{FetchResponse, Fetcher};
use std::sync::Arc;

/// Result of probing one site for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    /// Display label: site name, category and probed URL
    pub label: String,
    /// Name of the probed site
    pub site_name: String,
    /// Whether the account appears to exist
    pub found: bool,
}

/// Probes a single site and applies its match rules.
pub struct MatchEvaluator {
    fetcher: Arc<dyn Fetcher>,
    must_mention_identifier: bool,
}

impl MatchEvaluator {
    /// Create an evaluator fetching through `fetcher`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, must_mention_identifier: bool) -> Self {
        Self {
            fetcher,
            must_mention_identifier,
        }
    }

    /// Probe `site` for `identifier`.
    ///
    /// Network failures resolve to `found = false`; this never errors.
    pub async fn probe(&self, identifier: &Identifier, site: &SiteDefinition) -> ProbeOutcome {
        let url = site.check_url(identifier);
        let response = self.fetcher.fetch(&url).await;
        let found = evaluate(identifier, site, &response, self.must_mention_identifier);

        ProbeOutcome {
            label: site.label(&url),
            site_name: site.name.clone(),
            found,
        }
    }
}

/// Apply the match rules to a fetched response.
///
/// Checks run in order and the first failing one decides:
/// 1. the body must be present and non-empty;
/// 2. the status must equal the site's expected status;
/// 3. the body must contain the site's expected text;
/// 4. with `must_mention_identifier`, the body must mention the identifier,
///    ignoring case;
/// 5. for an identifier with a `.`, the part before the first `.` must not
///    appear followed by `<` or `"`: such sites strip punctuation and would
///    report `bob` when asked for `bob.abc`.
#[must_use]
pub fn evaluate(
    identifier: &Identifier,
    site: &SiteDefinition,
    response: &FetchResponse,
    must_mention_identifier: bool,
) -> bool {
    let Some(body) = response.content() else {
        return false;
    };

    if site.expected_status.is_none() || response.status != site.expected_status {
        return false;
    }

    match &site.expected_body {
        Some(expected) if body.contains(expected.as_str()) => {}
        _ => return false,
    }

    if must_mention_identifier
        && !body
            .to_lowercase()
            .contains(&identifier.as_str().to_lowercase())
    {
        tracing::debug!(site = %site.name, "skipping site, identifier not mentioned");
        return false;
    }

    if let Some(prefix) = identifier.dotted_prefix() {
        if body.contains(&format!("{prefix}<")) || body.contains(&format!("{prefix}\"")) {
            return false;
        }
    }

    true
}
