//! Landing-page retrieval.
//!
//! [`LandingPageSource`] is the seam between the batch pipeline and the
//! network: production code uses [`HttpLandingPages`], tests can hand in
//! canned HTML.

mod error;
mod http_client;

pub use error::FetchError;
pub use http_client::{CONNECT_TIMEOUT_SECS, HttpLandingPages, READ_TIMEOUT_SECS};

use async_trait::async_trait;

/// Something that can return the HTML of a landing page.
///
/// Uses `async_trait` so the batch driver can hold a `Box<dyn LandingPageSource>`.
#[async_trait]
pub trait LandingPageSource: Send + Sync {
    /// Returns the body of the page at `url`.
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}
