//! Shared fixtures for scanner integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use spoor_catalog::{SiteCatalog, SiteDefinition};
use spoor_fetch::{FetchResponse, Fetcher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Site whose check URL is `https://{name}.example/{account}` and which
/// expects status 200 and the text `profile`.
pub fn site(name: &str) -> SiteDefinition {
    SiteDefinition {
        name: name.to_string(),
        category: "test".to_string(),
        check_url_template: format!("https://{name}.example/{{account}}"),
        usable: true,
        expected_status: Some(200),
        expected_body: Some("profile".to_string()),
    }
}

pub fn catalog(names: &[&str]) -> SiteCatalog {
    SiteCatalog::new(names.iter().map(|name| site(name)))
}

pub fn url(site: &str, account: &str) -> String {
    format!("https://{site}.example/{account}")
}

pub fn label(site: &str, account: &str) -> String {
    format!("{site} (Category: test)\n{}", url(site, account))
}

/// Answers from a fixed URL table; unknown URLs fail.
///
/// Sites listed as echoing answer any account with a matching profile page.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, FetchResponse>>,
    echoing: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: impl Into<String>, response: FetchResponse) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .insert(url.into(), response);
        self
    }

    pub fn echoing(self, site: &str) -> Self {
        self.echoing
            .lock()
            .expect("echoing lock")
            .push(site.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(response) = self.responses.lock().expect("responses lock").get(url) {
            return response.clone();
        }

        let echoes = self
            .echoing
            .lock()
            .expect("echoing lock")
            .iter()
            .any(|site| url.starts_with(&format!("https://{site}.")));
        if echoes {
            let account = url.rsplit('/').next().unwrap_or_default();
            return FetchResponse::new(200, format!("<p>profile of {account}</p>"));
        }

        FetchResponse::failed()
    }
}

/// Sleeps on every fetch and records the highest number of fetches in flight.
#[derive(Default)]
pub struct CountingFetcher {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingFetcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> FetchResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let account = url.rsplit('/').next().unwrap_or_default();
        FetchResponse::new(200, format!("profile {account}"))
    }
}
