//! A classified and resolved paper reference.

use std::fmt;

use super::classify::{classify, strip_query};
use super::resolve::resolve;
use super::{Endpoints, ParseError, Publisher};

/// A paper identified on a specific publisher site.
///
/// `publisher` and `canonical_id` always agree: classifying `canonical_id`
/// yields `publisher`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperReference {
    raw_input: String,
    publisher: Publisher,
    canonical_id: String,
}

impl PaperReference {
    /// Classifies `raw` and resolves its canonical identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Unclassified`] when `raw` belongs to neither
    /// publisher, or [`ParseError::Unresolvable`] when no identifier can be
    /// derived from it.
    #[tracing::instrument(level = "debug", skip(raw), fields(input = %raw))]
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let trimmed = raw.trim();
        let stripped = strip_query(trimmed);
        let publisher = classify(stripped).ok_or_else(|| ParseError::unclassified(trimmed))?;
        let canonical_id = resolve(stripped, publisher)?;

        // Resolvers only emit numeric ids for IEEE and DOIs for ACM.
        debug_assert_eq!(classify(&canonical_id), Some(publisher));

        Ok(Self {
            raw_input: trimmed.to_string(),
            publisher,
            canonical_id,
        })
    }

    /// The input line this reference was parsed from.
    #[must_use]
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    #[must_use]
    pub fn publisher(&self) -> Publisher {
        self.publisher
    }

    #[must_use]
    pub fn canonical_id(&self) -> &str {
        &self.canonical_id
    }

    /// Landing page URL for this paper.
    #[must_use]
    pub fn landing_url(&self, endpoints: &Endpoints) -> String {
        endpoints.landing_url(self.publisher, &self.canonical_id)
    }

    /// Direct PDF URL for this paper.
    #[must_use]
    pub fn download_url(&self, endpoints: &Endpoints) -> String {
        endpoints.download_url(self.publisher, &self.canonical_id)
    }

    /// Canonical id with `/` and `.` replaced by `-`, safe as a file name stem.
    #[must_use]
    pub fn hyphenated_id(&self) -> String {
        self.canonical_id.replace(['/', '.'], "-")
    }
}

impl fmt::Display for PaperReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.publisher, self.canonical_id)
    }
}
