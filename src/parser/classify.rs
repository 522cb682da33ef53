//! Publisher classification of raw input strings.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::Publisher;

/// Shape of a bare DOI as accepted by the ACM resolver: `10.1145/3549555.3549587`.
static DOI_SHAPE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"^\d+\.\d+/[\w.]+$"));

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Drops everything from the first `?`, e.g. `?casa_token=...` tracking suffixes.
#[must_use]
pub fn strip_query(input: &str) -> &str {
    input.split_once('?').map_or(input, |(head, _)| head)
}

/// Returns true if `value` is a non-empty run of ASCII digits.
#[must_use]
pub fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Returns true if `value` has the bare DOI shape `digits.digits/suffix`.
#[must_use]
pub fn looks_like_doi(value: &str) -> bool {
    DOI_SHAPE.is_match(value)
}

/// Returns the host of an `http`-prefixed input: its third `/`-delimited segment.
///
/// Inputs that do not start with `http` are not treated as URLs.
#[must_use]
pub fn extract_host(input: &str) -> Option<&str> {
    if !input.starts_with("http") {
        return None;
    }
    input.split('/').nth(2).filter(|host| !host.is_empty())
}

/// Classifies input as an IEEE or ACM reference.
///
/// Bare numeric ids and DOIs are recognised before any host inspection; URLs
/// are matched on their host. Returns `None` for anything else.
#[must_use]
pub fn classify(input: &str) -> Option<Publisher> {
    let input = strip_query(input.trim());

    let publisher = if is_numeric(input) {
        Some(Publisher::Ieee)
    } else if looks_like_doi(input) {
        Some(Publisher::Acm)
    } else {
        extract_host(input).and_then(publisher_for_host)
    };

    trace!(input = %input, publisher = ?publisher, "classified input");
    publisher
}

fn publisher_for_host(host: &str) -> Option<Publisher> {
    [Publisher::Ieee, Publisher::Acm]
        .into_iter()
        .find(|publisher| host.eq_ignore_ascii_case(publisher.host()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_numeric_is_ieee() {
        for id in ["1", "4764139", "0001", "99999999999999999999"] {
            assert_eq!(classify(id), Some(Publisher::Ieee), "{id}");
        }
    }

    #[test]
    fn test_classify_doi_shape_is_acm() {
        for doi in [
            "10.1145/368453.368641",
            "10.1145/3549555.3549587",
            "1.2/abc_def",
            "10.1109/5.771073",
        ] {
            assert_eq!(classify(doi), Some(Publisher::Acm), "{doi}");
        }
    }

    #[test]
    fn test_classify_urls_by_host() {
        assert_eq!(
            classify("https://ieeexplore.ieee.org/document/4764139"),
            Some(Publisher::Ieee)
        );
        assert_eq!(
            classify("http://ieeexplore.ieee.org/abstract/document/4764139/"),
            Some(Publisher::Ieee)
        );
        assert_eq!(
            classify("https://dl.acm.org/doi/10.1145/368453.368641"),
            Some(Publisher::Acm)
        );
        assert_eq!(
            classify("https://DL.ACM.ORG/doi/10.1145/368453.368641"),
            Some(Publisher::Acm)
        );
    }

    #[test]
    fn test_classify_ignores_query_string() {
        let base = "https://dl.acm.org/doi/10.1145/3549555.3549587";
        assert_eq!(
            classify(&format!("{base}?casa_token=XYZ")),
            classify(base)
        );
        assert_eq!(classify("4764139?foo=bar"), Some(Publisher::Ieee));
    }

    #[test]
    fn test_classify_unknown_inputs() {
        for input in [
            "",
            "hello",
            "https://arxiv.org/abs/2301.00001",
            "ftp://dl.acm.org/doi/10.1145/1.2",
            "dl.acm.org/doi/10.1145/368453.368641",
            "12a",
            "10.1145/",
            "https://",
        ] {
            assert_eq!(classify(input), None, "{input:?}");
        }
    }

    #[test]
    fn test_subdomain_does_not_match_publisher_host() {
        assert_eq!(classify("https://www.dl.acm.org/doi/10.1/2"), None);
        assert_eq!(classify("https://ieee.org/document/1"), None);
    }

    #[test]
    fn test_extract_host_third_segment() {
        assert_eq!(
            extract_host("https://dl.acm.org/doi/10.1/x"),
            Some("dl.acm.org")
        );
        assert_eq!(extract_host("http://host"), Some("host"));
        assert_eq!(extract_host("dl.acm.org/doi"), None);
        assert_eq!(extract_host("http:"), None);
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("a?b?c"), "a");
        assert_eq!(strip_query("abc"), "abc");
        assert_eq!(strip_query("?x"), "");
    }
}
