//! Shared User-Agent strings for landing-page and download HTTP clients.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/paperfetch";

/// Browser User-Agent used as fallback when publisher sites return 403.
///
/// Requests go out with the tool User-Agent first. IEEE Xplore and ACM DL both
/// run bot detection in front of landing pages, so a 403 is retried once with
/// this browser-like value before giving up.
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Default User-Agent for PDF download requests.
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("paperfetch/{version} (academic-research-tool; +{PROJECT_UA_URL})")
}

/// Default User-Agent for landing-page requests.
#[must_use]
pub(crate) fn default_landing_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("paperfetch/{version} (research-tool; +{PROJECT_UA_URL})")
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_format_consistency() {
        let download_ua = default_download_user_agent();
        let landing_ua = default_landing_user_agent();
        assert!(download_ua.contains(PROJECT_UA_URL));
        assert!(landing_ua.contains(PROJECT_UA_URL));
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            download_ua
                .strip_prefix("paperfetch/")
                .and_then(|s| s.split(' ').next())
                .expect("download UA has version"),
        );
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            landing_ua
                .strip_prefix("paperfetch/")
                .and_then(|s| s.split(' ').next())
                .expect("landing UA has version"),
        );
    }

    #[test]
    fn test_browser_user_agent_looks_like_a_browser() {
        assert!(BROWSER_USER_AGENT.starts_with("Mozilla/5.0"));
        assert!(!BROWSER_USER_AGENT.contains("paperfetch"));
    }
}
