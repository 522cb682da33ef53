//! Supported publishers and their URL conventions.

use std::fmt;

use crate::title::TitleSelector;

/// Host of IEEE Xplore document links.
pub const IEEE_HOST: &str = "ieeexplore.ieee.org";

/// Host of ACM Digital Library links.
pub const ACM_HOST: &str = "dl.acm.org";

const DEFAULT_IEEE_BASE_URL: &str = "http://ieeexplore.ieee.org";
const DEFAULT_ACM_BASE_URL: &str = "https://dl.acm.org";

/// A publisher site this tool knows how to fetch from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Publisher {
    /// IEEE Xplore; canonical ids are numeric article numbers.
    Ieee,
    /// ACM Digital Library; canonical ids are DOIs.
    Acm,
}

impl Publisher {
    /// Host that links to this publisher must carry.
    #[must_use]
    pub fn host(self) -> &'static str {
        match self {
            Self::Ieee => IEEE_HOST,
            Self::Acm => ACM_HOST,
        }
    }

    /// Where the paper title lives on this publisher's landing page.
    ///
    /// ACM marks the title with a `citation__title` heading; IEEE's citation
    /// markup differs, so the document `<title>` is used instead.
    #[must_use]
    pub fn title_selector(self) -> TitleSelector {
        match self {
            Self::Ieee => TitleSelector::DocumentTitle,
            Self::Acm => TitleSelector::CitationTitle,
        }
    }
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ieee => write!(f, "IEEE"),
            Self::Acm => write!(f, "ACM"),
        }
    }
}

/// Base URLs used to build landing-page and PDF links.
///
/// Defaults point at the real publisher sites; tests swap in a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Base URL for IEEE Xplore requests.
    pub ieee_base_url: String,
    /// Base URL for ACM DL requests.
    pub acm_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            ieee_base_url: DEFAULT_IEEE_BASE_URL.to_string(),
            acm_base_url: DEFAULT_ACM_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Uses the same base URL for both publishers (for tests).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            ieee_base_url: base_url.clone(),
            acm_base_url: base_url,
        }
    }

    fn base(&self, publisher: Publisher) -> &str {
        match publisher {
            Publisher::Ieee => self.ieee_base_url.trim_end_matches('/'),
            Publisher::Acm => self.acm_base_url.trim_end_matches('/'),
        }
    }

    /// Landing page describing the paper.
    #[must_use]
    pub fn landing_url(&self, publisher: Publisher, id: &str) -> String {
        let base = self.base(publisher);
        match publisher {
            Publisher::Ieee => format!("{base}/document/{id}"),
            Publisher::Acm => format!("{base}/doi/{id}"),
        }
    }

    /// Direct PDF link for the paper.
    #[must_use]
    pub fn download_url(&self, publisher: Publisher, id: &str) -> String {
        let base = self.base(publisher);
        match publisher {
            Publisher::Ieee => {
                format!("{base}/stampPDF/getPDF.jsp?tp=&isnumber=&arnumber={id}")
            }
            Publisher::Acm => format!("{base}/doi/pdf/{id}"),
        }
    }
}
