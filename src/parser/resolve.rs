//! Canonical identifier resolution per publisher.

use tracing::debug;

use super::classify::{is_numeric, looks_like_doi, strip_query};
use super::{ParseError, Publisher};

/// Extracts the publisher's canonical paper identifier from `input`.
///
/// The query string is ignored. IEEE ids are numeric article numbers taken
/// from the input itself or from one of its last two path segments; ACM ids
/// are the DOI formed by the last two non-empty path segments.
///
/// # Errors
///
/// Returns [`ParseError::Unresolvable`] when no identifier of the expected
/// shape can be derived.
pub fn resolve(input: &str, publisher: Publisher) -> Result<String, ParseError> {
    let input = strip_query(input.trim());
    let id = match publisher {
        Publisher::Ieee => resolve_ieee(input)?,
        Publisher::Acm => resolve_acm(input)?,
    };
    debug!(%publisher, input = %input, id = %id, "resolved canonical id");
    Ok(id)
}

fn resolve_ieee(input: &str) -> Result<String, ParseError> {
    if is_numeric(input) {
        return Ok(input.to_string());
    }

    let segments: Vec<&str> = input.split('/').collect();
    segments
        .iter()
        .rev()
        .take(2)
        .find(|segment| is_numeric(segment))
        .map(|segment| (*segment).to_string())
        .ok_or_else(|| {
            ParseError::unresolvable(
                input,
                Publisher::Ieee,
                "neither of the last two path segments is a numeric article number",
            )
        })
}

fn resolve_acm(input: &str) -> Result<String, ParseError> {
    if looks_like_doi(input) {
        return Ok(input.to_string());
    }

    let segments: Vec<&str> = input.split('/').collect();
    let (prefix, suffix) = match segments.as_slice() {
        [.., prefix, suffix, ""] => (prefix, suffix),
        [.., prefix, suffix] if !suffix.is_empty() => (prefix, suffix),
        _ => {
            return Err(ParseError::unresolvable(
                input,
                Publisher::Acm,
                "URL has too few path segments to hold a DOI",
            ));
        }
    };

    let id = format!("{prefix}/{suffix}");
    if looks_like_doi(&id) {
        Ok(id)
    } else {
        Err(ParseError::unresolvable(
            input,
            Publisher::Acm,
            &format!("'{id}' is not DOI-shaped"),
        ))
    }
}
