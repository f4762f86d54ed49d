mod common;

use common::{catalog, label, url, CountingFetcher, MockFetcher};
use spoor_core::Identifier;
use spoor_fetch::FetchResponse;
use spoor_scanner::{evaluate, MatchEvaluator, ProbeEngine};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn engine(fetcher: Arc<dyn spoor_fetch::Fetcher>, max_workers: usize) -> ProbeEngine {
    ProbeEngine::new(Arc::new(MatchEvaluator::new(fetcher, true))).with_max_workers(max_workers)
}

fn id(value: &str) -> Identifier {
    Identifier::new(value).expect("valid identifier")
}

#[tokio::test]
async fn test_three_site_scenario_returns_only_match() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .respond(
                url("alpha", "bob"),
                FetchResponse::new(200, "<html>profile page of bob</html>"),
            )
            .respond(url("beta", "bob"), FetchResponse::new(404, ""))
            .respond(url("gamma", "bob"), FetchResponse::new(200, "no match")),
    );

    let labels = engine(fetcher.clone(), 50)
        .scan(&id("bob"), &catalog(&["alpha", "beta", "gamma"]))
        .await;

    assert_eq!(labels, vec![label("alpha", "bob")]);
    assert_eq!(fetcher.calls(), 3);
}

#[tokio::test]
async fn test_matches_are_subset_satisfying_rules() {
    let sites = catalog(&["alpha", "beta", "gamma", "delta"]);
    let responses = [
        ("alpha", FetchResponse::new(200, "profile of carol")),
        ("beta", FetchResponse::new(200, "profile carol.smith here")),
        ("gamma", FetchResponse::new(200, "profile <b>carol</b>")),
        ("delta", FetchResponse::new(500, "profile carol")),
    ];

    for name in ["carol", "carol.smith", "dave"] {
        let fetcher = responses
            .iter()
            .fold(MockFetcher::new(), |fetcher, (site, response)| {
                fetcher.respond(url(site, name), response.clone())
            });
        let identifier = id(name);

        let labels = engine(Arc::new(fetcher), 3).scan(&identifier, &sites).await;

        let all: HashSet<String> = sites
            .sites()
            .iter()
            .map(|site| label(&site.name, name))
            .collect();
        for matched in &labels {
            assert!(all.contains(matched), "unexpected label {matched}");

            let site = sites
                .sites()
                .iter()
                .find(|site| label(&site.name, name) == *matched)
                .expect("site for label");
            let (_, response) = responses
                .iter()
                .find(|(site_name, _)| *site_name == site.name)
                .expect("response for site");
            assert!(evaluate(&identifier, site, response, true));
        }
    }
}

#[tokio::test]
async fn test_dotted_identifier_against_stripping_site() {
    let sites = catalog(&["alpha", "beta"]);
    let fetcher = MockFetcher::new()
        .respond(
            url("alpha", "bob.abc"),
            FetchResponse::new(200, "profile bob.abc <span>bob</span>"),
        )
        .respond(
            url("beta", "bob.abc"),
            FetchResponse::new(200, "profile of bob.abc"),
        );

    let labels = engine(Arc::new(fetcher), 2).scan(&id("bob.abc"), &sites).await;

    assert_eq!(labels, vec![label("beta", "bob.abc")]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_never_exceeds_worker_limit() {
    let names: Vec<String> = (0..50).map(|i| format!("site{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let fetcher = Arc::new(CountingFetcher::new(Duration::from_millis(20)));

    let report = engine(fetcher.clone(), 5)
        .scan_report(&id("bob"), &catalog(&refs))
        .await;

    assert_eq!(fetcher.calls(), 50);
    assert_eq!(report.outcomes.len(), 50);
    assert!(fetcher.max_in_flight() <= 5);
    assert_eq!(fetcher.max_in_flight(), 5);
}

#[tokio::test]
async fn test_failed_fetches_resolve_to_not_found() {
    let report = engine(Arc::new(MockFetcher::new()), 4)
        .scan_report(&id("bob"), &catalog(&["alpha", "beta"]))
        .await;

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.found().count(), 0);
}

#[tokio::test]
async fn test_concurrent_scans_do_not_share_results() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .respond(url("alpha", "alice"), FetchResponse::new(200, "profile alice"))
            .respond(url("beta", "bob"), FetchResponse::new(200, "profile bob")),
    );
    let engine = engine(fetcher, 2);
    let sites = catalog(&["alpha", "beta"]);
    let alice = id("alice");
    let bob = id("bob");

    let (alice_labels, bob_labels) =
        tokio::join!(engine.scan(&alice, &sites), engine.scan(&bob, &sites));

    assert_eq!(alice_labels, vec![label("alpha", "alice")]);
    assert_eq!(bob_labels, vec![label("beta", "bob")]);
}
