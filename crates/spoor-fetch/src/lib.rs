//! Spoor Fetch - HTTP primitive for catalog retrieval and account probes.
//!
//! Probes must never abort a scan because one site misbehaves, so the
//! [`Fetcher`] trait returns a [`FetchResponse`] rather than a `Result`:
//! timeouts, TLS failures and unreadable bodies all come back as a response
//! without a body.
//!
//! # Example
//!
//! ```rust,ignore
//! use spoor_fetch::{FetchOptions, Fetcher, HttpFetcher};
//!
//! let fetcher = HttpFetcher::new(&FetchOptions::from(&config.probing))?;
//! let response = fetcher.fetch("https://example.com/users/bob").await;
//! if let Some(body) = response.content() {
//!     println!("{} bytes, status {:?}", body.len(), response.status);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod error;

// Re-export commonly used types
pub use client::{FetchOptions, FetchResponse, Fetcher, HttpFetcher};
pub use error::{FetchError, ProbeError, Result};
