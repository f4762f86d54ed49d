//! The `Fetcher` trait and its `reqwest` implementation.

use crate::error::{FetchError, ProbeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use spoor_core::ProbingConfig;
use std::time::Duration;

/// Outcome of one GET request.
///
/// A missing body means the request failed; `status` may still be set when
/// headers arrived but the body could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code, if a response arrived
    pub status: Option<u16>,
    /// Response body, if it could be read
    pub body: Option<String>,
}

impl FetchResponse {
    /// A response carrying a status and a body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: Some(body.into()),
        }
    }

    /// A request that produced nothing.
    #[must_use]
    pub fn failed() -> Self {
        Self::default()
    }

    /// The body, treating an empty body the same as a missing one.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.body.as_deref().filter(|body| !body.is_empty())
    }
}

/// Performs GET requests without surfacing transport failures.
///
/// Implementations must be thread-safe: one fetcher is shared by every
/// probe worker.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, folding any failure into [`FetchResponse::failed`].
    async fn fetch(&self, url: &str) -> FetchResponse;
}

/// Request policy applied to every fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Per-request timeout, connection through body
    pub timeout: Duration,
    /// User agent header value
    pub user_agent: String,
    /// Whether to reject invalid TLS certificates
    pub verify_tls: bool,
}

impl FetchOptions {
    /// Options for downloading the site catalog feed.
    ///
    /// Shares the probe timeout but always verifies TLS and identifies as
    /// Spoor rather than a browser.
    #[must_use]
    pub fn for_feed(config: &ProbingConfig) -> Self {
        Self {
            timeout: config.fetch_timeout(),
            user_agent: concat!("spoor/", env!("CARGO_PKG_VERSION")).to_string(),
            verify_tls: true,
        }
    }
}

impl From<&ProbingConfig> for FetchOptions {
    fn from(config: &ProbingConfig) -> Self {
        Self {
            timeout: config.fetch_timeout(),
            user_agent: config.user_agent.clone(),
            verify_tls: config.verify_tls,
        }
    }
}

/// `reqwest`-backed fetcher.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given request policy.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    async fn try_fetch(
        &self,
        url: &str,
    ) -> std::result::Result<FetchResponse, (Option<u16>, ProbeError)> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| (None, ProbeError::from(e)))?;
        let status = response.status().as_u16();

        let body = response
            .text()
            .await
            .map_err(|e| (Some(status), ProbeError::from(e)))?;

        Ok(FetchResponse::new(status, body))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResponse {
        match self.try_fetch(url).await {
            Ok(response) => response,
            Err((status, e)) => {
                tracing::debug!(url, error = %e, "fetch failed");
                FetchResponse { status, body: None }
            }
        }
    }
}
