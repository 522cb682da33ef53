//! Paperfetch Core Library
//!
//! This library turns IEEE Xplore and ACM Digital Library links into local PDF
//! files named after the paper title, fetching either directly or through a
//! proxy host reachable over SSH.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Publisher classification and canonical identifier resolution
//! - [`fetch`] - Landing-page retrieval over HTTP
//! - [`title`] - Title extraction and filesystem-safe sanitization
//! - [`download`] - Streaming HTTP download client used by local transfers
//! - [`transfer`] - Download planning, existence checks, local and proxy transfers
//! - [`batch`] - Sequential batch driver over a newline-separated URL list

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod download;
pub mod fetch;
pub mod parser;
pub mod title;
pub mod transfer;
mod user_agent;

// Re-export commonly used types
pub use batch::{
    BatchDriver, BatchError, BatchSummary, FailureKind, FailurePolicy, ItemError, ItemFailure,
    split_url_list,
};
pub use download::{DownloadError, HttpClient};
pub use fetch::{FetchError, HttpLandingPages, LandingPageSource};
pub use parser::{Endpoints, PaperReference, ParseError, Publisher, classify, resolve};
pub use title::{SanitizedTitle, TitleError, TitleSelector, extract_title, sanitize_title};
pub use transfer::{
    DownloadPlan, LocalDirectoryIndex, LocalTransfer, ProxySettings, RemoteProxyTransfer,
    Transfer, TransferEngine, TransferError, TransferMode, TransferOutcome,
};
