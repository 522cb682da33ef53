//! Constants for the download module.

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Path fragments of publisher PDF endpoints.
///
/// An HTML answer from one of these is a login wall rather than a paper.
pub const PDF_ENDPOINT_MARKERS: &[&str] = &[".pdf", "/pdf/", "/stamppdf/", "getpdf"];

/// URL fragments that identify institutional login or SSO pages.
pub const LOGIN_PATTERNS: &[&str] = &[
    "/login",
    "/signin",
    "/sign-in",
    "/sso/",
    "/shibboleth",
    "/cas/",
    "/idp/",
    "/action/showlogin",
];
