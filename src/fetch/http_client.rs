//! HTTP client for publisher landing pages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use crate::user_agent::{self, BROWSER_USER_AGENT};

use super::{FetchError, LandingPageSource};

/// Default landing-page connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default landing-page read timeout (30 seconds).
pub const READ_TIMEOUT_SECS: u64 = 30;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Fetches landing pages over HTTP, following redirects.
///
/// A 403 answer is retried once with a browser User-Agent.
#[derive(Debug, Clone)]
pub struct HttpLandingPages {
    client: Client,
}

impl HttpLandingPages {
    /// Creates a fetcher with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a fetcher with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .user_agent(user_agent::default_landing_user_agent())
            .gzip(true)
            .build()
            .map_err(|source| FetchError::Client { source })?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str, user_agent: Option<&str>) -> Result<reqwest::Response, FetchError> {
        let mut request = self.client.get(url).header(ACCEPT, HTML_ACCEPT);
        if let Some(ua) = user_agent {
            request = request.header(USER_AGENT, ua);
        }
        request
            .send()
            .await
            .map_err(|e| FetchError::from_send(url, e))
    }
}

#[async_trait]
impl LandingPageSource for HttpLandingPages {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let mut response = self.get(url, None).await?;
        if response.status() == StatusCode::FORBIDDEN {
            warn!("landing page returned 403; retrying with browser User-Agent");
            response = self.get(url, Some(BROWSER_USER_AGENT)).await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        debug!(final_url = %response.url(), "landing page fetched");
        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}
