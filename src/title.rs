//! Paper title extraction from landing pages and sanitization into file names.
//!
//! Publisher landing pages carry the title either in a dedicated citation
//! heading (ACM) or in the document `<title>` with a `| Site Name` suffix
//! (IEEE). The extracted text is turned into a [`SanitizedTitle`] that is safe
//! to use as a file name stem.

use std::fmt;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, instrument};

/// Maximum length, in characters, of a sanitized title.
pub const TITLE_LENGTH_LIMIT: usize = 100;

static CITATION_TITLE: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"h1[class="citation__title"]"#));
static DOCUMENT_TITLE: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("title"));

fn compile_static_selector(selector: &str) -> Selector {
    Selector::parse(selector)
        .unwrap_or_else(|e| panic!("invalid static selector '{selector}': {e:?}"))
}

/// Which element of a landing page holds the paper title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSelector {
    /// The first `<h1 class="citation__title">` heading.
    CitationTitle,
    /// The document `<title>` element.
    DocumentTitle,
}

impl TitleSelector {
    fn selector(self) -> &'static Selector {
        match self {
            Self::CitationTitle => &CITATION_TITLE,
            Self::DocumentTitle => &DOCUMENT_TITLE,
        }
    }
}

impl fmt::Display for TitleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CitationTitle => write!(f, "h1.citation__title"),
            Self::DocumentTitle => write!(f, "title"),
        }
    }
}

/// Errors raised while extracting a title.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    /// The landing page has no element matching the selector.
    #[error(
        "no <{selector}> element in landing page\n  Suggestion: The page may be paywalled, blocked, or restructured; open it in a browser to check"
    )]
    NotFound {
        /// Selector that matched nothing.
        selector: TitleSelector,
    },

    /// The title is empty or consists only of whitespace and slashes.
    #[error("title {raw:?} is empty after normalization")]
    Empty {
        /// Title text before sanitization.
        raw: String,
    },
}

/// A title reduced to a non-empty, filesystem-safe file name stem.
///
/// Holds at most [`TITLE_LENGTH_LIMIT`] characters and contains no `/` and no
/// whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SanitizedTitle(String);

impl SanitizedTitle {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SanitizedTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extracts the paper title from a landing page and sanitizes it.
///
/// Text after the first `|` (site-name suffixes such as
/// `| IEEE Conference Publication | IEEE Xplore`) is dropped.
///
/// # Errors
///
/// Returns [`TitleError::NotFound`] if no element matches `selector`, or
/// [`TitleError::Empty`] if the remaining title is blank.
#[instrument(skip(html), fields(html_len = html.len(), selector = %selector))]
pub fn extract_title(html: &str, selector: TitleSelector) -> Result<SanitizedTitle, TitleError> {
    let document = Html::parse_document(html);
    let element = document
        .select(selector.selector())
        .next()
        .ok_or(TitleError::NotFound { selector })?;

    let text = element.text().collect::<String>();
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let headline = collapsed.split('|').next().unwrap_or_default().trim();
    debug!(title = %headline, "extracted raw title");

    sanitize_title(headline)
}

/// Turns a raw title into a file name stem.
///
/// Trims the input, maps each whitespace character to `_` and each `/` to
/// `-`, then truncates to [`TITLE_LENGTH_LIMIT`] characters. Applying it to an
/// already sanitized title returns the same title.
///
/// # Errors
///
/// Returns [`TitleError::Empty`] if `raw` has no character other than
/// whitespace and `/`.
pub fn sanitize_title(raw: &str) -> Result<SanitizedTitle, TitleError> {
    let trimmed = raw.trim();
    if trimmed.chars().all(|c| c == '/' || c.is_whitespace()) {
        return Err(TitleError::Empty {
            raw: raw.to_string(),
        });
    }

    let sanitized: String = trimmed
        .chars()
        .map(|c| match c {
            '/' => '-',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .take(TITLE_LENGTH_LIMIT)
        .collect();

    Ok(SanitizedTitle(sanitized))
}
