//! Error types for the fetch subsystem.

use thiserror::Error;

/// Errors raised while building a fetcher.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client could not be constructed
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Why a single request produced no usable response.
///
/// These never escape [`crate::Fetcher::fetch`]; they are logged and folded
/// into an empty [`crate::FetchResponse`].
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Headers arrived but the body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_body() || err.is_decode() {
            Self::Body(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Result type for fetcher construction.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::Client("no TLS backend".to_string());
        assert_eq!(
            err.to_string(),
            "failed to create HTTP client: no TLS backend"
        );
        assert_eq!(ProbeError::Timeout.to_string(), "request timed out");
    }
}
