//! Error types for classification and identifier resolution.

use thiserror::Error;

use super::Publisher;

/// Errors that can occur while turning raw input into a [`PaperReference`](super::PaperReference).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input is neither a bare identifier, a DOI, nor a link on a known publisher host.
    #[error(
        "'{input}' is neither an IEEE nor an ACM reference\n  Suggestion: Use an ieeexplore.ieee.org or dl.acm.org link, a numeric IEEE id, or a DOI"
    )]
    Unclassified {
        /// The input that could not be classified.
        input: String,
    },

    /// Input was classified but no canonical identifier could be derived from it.
    #[error("cannot resolve {publisher} identifier from '{input}': {reason}")]
    Unresolvable {
        /// The query-stripped input.
        input: String,
        /// Publisher the input was classified as.
        publisher: Publisher,
        /// Why resolution failed.
        reason: String,
    },
}

impl ParseError {
    /// Creates an `Unclassified` error.
    #[must_use]
    pub fn unclassified(input: &str) -> Self {
        Self::Unclassified {
            input: input.to_string(),
        }
    }

    /// Creates an `Unresolvable` error.
    #[must_use]
    pub fn unresolvable(input: &str, publisher: Publisher, reason: &str) -> Self {
        Self::Unresolvable {
            input: input.to_string(),
            publisher,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclassified_message_names_input_and_hosts() {
        let msg = ParseError::unclassified("https://arxiv.org/abs/2301.00001").to_string();
        assert!(msg.contains("arxiv.org"));
        assert!(msg.contains("neither an IEEE nor an ACM"));
        assert!(msg.contains("dl.acm.org"));
    }

    #[test]
    fn test_unresolvable_message_names_publisher() {
        let err = ParseError::unresolvable(
            "https://ieeexplore.ieee.org/document/abc",
            Publisher::Ieee,
            "no numeric path segment",
        );
        let msg = err.to_string();
        assert!(msg.contains("IEEE"));
        assert!(msg.contains("document/abc"));
        assert!(msg.contains("no numeric path segment"));
    }
}
