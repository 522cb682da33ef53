//! Input parsing: publisher classification and canonical identifier resolution.
//!
//! Every input line is either a bare IEEE article number (`4764139`), a bare
//! DOI (`10.1145/368453.368641`), or a link on `ieeexplore.ieee.org` /
//! `dl.acm.org`. [`PaperReference::parse`] combines [`classify`] and
//! [`resolve`] into one step.
//!
//! # Example
//!
//! ```
//! use paperfetch_core::parser::{PaperReference, Publisher};
//!
//! let reference = PaperReference::parse("https://dl.acm.org/doi/10.1145/368453.368641/").unwrap();
//! assert_eq!(reference.publisher(), Publisher::Acm);
//! assert_eq!(reference.canonical_id(), "10.1145/368453.368641");
//! ```

mod classify;
mod error;
mod publisher;
mod reference;
mod resolve;

pub use classify::{classify, extract_host, is_numeric, looks_like_doi, strip_query};
pub use error::ParseError;
pub use publisher::{ACM_HOST, Endpoints, IEEE_HOST, Publisher};
pub use reference::PaperReference;
pub use resolve::resolve;
