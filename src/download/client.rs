//! HTTP client wrapper for downloading papers.
//!
//! [`HttpClient`] streams a publisher PDF endpoint straight to a destination
//! path, removing the partial file if anything goes wrong mid-transfer.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::constants::{
    CONNECT_TIMEOUT_SECS, LOGIN_PATTERNS, PDF_ENDPOINT_MARKERS, READ_TIMEOUT_SECS,
};
use super::error::DownloadError;
use crate::user_agent::{self, BROWSER_USER_AGENT};

/// HTTP client for downloading papers with streaming support.
///
/// Create once and reuse for every paper in a batch so connections are pooled.
///
/// # Example
///
/// ```no_run
/// use paperfetch_core::download::HttpClient;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let bytes = client
///     .download_to_path("https://dl.acm.org/doi/pdf/10.1145/368453.368641", Path::new("paper.pdf"))
///     .await?;
/// println!("wrote {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, DownloadError> {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the HTTP client cannot be built.
    pub fn new_with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_download_user_agent())
            .build()
            .map_err(|source| DownloadError::Client { source })?;
        Ok(Self { client })
    }

    /// Downloads `url` to exactly `destination`, overwriting any file there.
    ///
    /// A 403 answer is retried once with a browser User-Agent.
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status or a login page
    /// - Writing to disk fails
    #[instrument(skip(self), fields(url = %url, destination = %destination.display()))]
    pub async fn download_to_path(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<u64, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = match self.send_request(url, None).await {
            Err(DownloadError::AuthRequired { status: 403, .. }) => {
                warn!("download returned 403; retrying with browser User-Agent");
                self.send_request(url, Some(BROWSER_USER_AGENT)).await?
            }
            other => other?,
        };

        let mut file = File::create(destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;

        let bytes = match stream_to_file(&mut file, response, url, destination).await {
            Ok(bytes) => bytes,
            Err(e) => {
                drop(file);
                if let Err(cleanup) = tokio::fs::remove_file(destination).await {
                    warn!(error = %cleanup, "failed to remove partial download");
                }
                return Err(e);
            }
        };

        info!(bytes, "download complete");
        Ok(bytes)
    }

    async fn send_request(
        &self,
        url: &str,
        user_agent: Option<&str>,
    ) -> Result<reqwest::Response, DownloadError> {
        let mut request = self.client.get(url);
        if let Some(ua) = user_agent {
            request = request.header(USER_AGENT, ua);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            if matches!(status_code, 401 | 403 | 407) {
                let domain = Url::parse(url)
                    .ok()
                    .and_then(|u| u.host_str().map(std::string::ToString::to_string))
                    .unwrap_or_else(|| url.to_string());
                return Err(DownloadError::auth_required(url, status_code, domain));
            }
            return Err(DownloadError::http_status(url, status_code));
        }

        if let Some(auth_err) = detect_login_redirect(url, &response) {
            return Err(auth_err);
        }

        Ok(response)
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}

/// Returns true if the URL looks like a publisher PDF endpoint.
fn is_pdf_endpoint(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path = parsed.path().to_ascii_lowercase();
    PDF_ENDPOINT_MARKERS.iter().any(|marker| path.contains(marker))
}

/// Detects an HTML login page served in place of a PDF.
fn detect_login_redirect(
    original_url: &str,
    response: &reqwest::Response,
) -> Option<DownloadError> {
    if !is_pdf_endpoint(original_url) {
        return None;
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.to_ascii_lowercase().contains("text/html") {
        return None;
    }

    // An HTML page without a login marker may just be a publisher frame; keep it.
    let response_url = response.url().as_str().to_ascii_lowercase();
    if !LOGIN_PATTERNS
        .iter()
        .any(|pattern| response_url.contains(pattern))
    {
        debug!(
            url = %original_url,
            response_url = %response_url,
            "HTML response from PDF endpoint without login marker"
        );
        return None;
    }

    let domain = response
        .url()
        .host_str()
        .map_or_else(|| "unknown".to_string(), std::string::ToString::to_string);
    debug!(url = %original_url, domain = %domain, "login redirect detected");

    Some(DownloadError::auth_required(original_url, 0, domain))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

    /// Matches requests whose User-Agent contains "Chrome".
    struct BrowserUaMatcher;

    impl Match for BrowserUaMatcher {
        fn matches(&self, request: &Request) -> bool {
            request
                .headers
                .get("User-Agent")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ua| ua.contains("Chrome"))
        }
    }

    #[tokio::test]
    async fn test_download_to_path_writes_body() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .and(path("/doi/pdf/10.1145/1.2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/pdf")
                    .set_body_bytes(b"%PDF-1.7 body".to_vec()),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let dest = temp_dir.path().join("Some_Title.pdf");
        let bytes = client
            .download_to_path(&format!("{}/doi/pdf/10.1145/1.2", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(bytes, 13);
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.7 body");
    }

    #[tokio::test]
    async fn test_download_404_leaves_no_file() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let dest = temp_dir.path().join("missing.pdf");
        let result = client
            .download_to_path(&format!("{}/doi/pdf/x", server.uri()), &dest)
            .await;

        assert!(matches!(
            result,
            Err(DownloadError::HttpStatus { status: 404, .. })
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_cleanup_on_read_timeout() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"data".to_vec())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new_with_timeouts(30, 1).unwrap();
        let dest = temp_dir.path().join("slow.pdf");
        let result = client
            .download_to_path(&format!("{}/slow.pdf", server.uri()), &dest)
            .await;

        assert!(result.is_err(), "expected timeout or network error");
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert!(entries.is_empty(), "partial file left behind: {entries:?}");
    }

    #[tokio::test]
    async fn test_download_retries_403_with_browser_user_agent() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .and(BrowserUaMatcher)
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pdf".to_vec()))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .with_priority(u8::MAX)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let dest = temp_dir.path().join("paper.pdf");
        let bytes = client
            .download_to_path(&format!("{}/doi/pdf/10.1/2", server.uri()), &dest)
            .await
            .unwrap();
        assert_eq!(bytes, 3);
    }

    #[tokio::test]
    async fn test_persistent_403_is_auth_required() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let result = client
            .download_to_path(
                &format!("{}/doi/pdf/10.1/2", server.uri()),
                &temp_dir.path().join("p.pdf"),
            )
            .await;
        assert!(matches!(
            result,
            Err(DownloadError::AuthRequired { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn test_login_redirect_detected_for_pdf_endpoint() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .and(path("/doi/pdf/10.1/2"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/action/showLogin", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/action/showLogin"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/html; charset=utf-8")
                    .set_body_string("<html>Sign in</html>"),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let dest = temp_dir.path().join("p.pdf");
        let result = client
            .download_to_path(&format!("{}/doi/pdf/10.1/2", server.uri()), &dest)
            .await;

        assert!(matches!(
            result,
            Err(DownloadError::AuthRequired { status: 0, .. })
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let client = HttpClient::new().unwrap();
        let result = client
            .download_to_path("not a url", &temp_dir.path().join("p.pdf"))
            .await;
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }

    #[test]
    fn test_is_pdf_endpoint_publisher_urls() {
        assert!(is_pdf_endpoint(
            "http://ieeexplore.ieee.org/stampPDF/getPDF.jsp?tp=&isnumber=&arnumber=1"
        ));
        assert!(is_pdf_endpoint("https://dl.acm.org/doi/pdf/10.1145/1.2"));
        assert!(is_pdf_endpoint("https://example.com/Paper.PDF"));
        assert!(!is_pdf_endpoint("https://dl.acm.org/doi/10.1145/1.2"));
        assert!(!is_pdf_endpoint("not a url"));
    }
}
