//! Error types for landing-page retrieval.

use thiserror::Error;

/// Errors that can occur while fetching a publisher landing page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build landing-page HTTP client: {source}")]
    Client {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// Network-level error (DNS, connection refused, TLS, ...).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The landing page URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The landing page URL.
        url: String,
    },

    /// The publisher answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The landing page URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be read as text.
    #[error("unreadable response body from {url}: {source}")]
    Body {
        /// The landing page URL.
        url: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Maps a reqwest send error to `Timeout` or `Network`.
    pub fn from_send(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }
}
