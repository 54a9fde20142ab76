//! Error types for site-ia
//!
//! This module provides the error hierarchy using `thiserror`. The extraction
//! core only fails on contract violations; everything else here belongs to the
//! page acquisition and screenshot collaborators.

use thiserror::Error;

/// The main error type for site-ia operations
#[derive(Error, Debug)]
pub enum Error {
    /// IA extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Plain HTTP fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Screenshot capture errors
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),
}

/// Errors raised by the extraction core
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The base URL links are resolved against is not an absolute URL
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected base URL
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation or readiness wait timed out
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Plain HTTP fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP error {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },
}

/// Screenshot capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Screenshot failed
    #[error("Screenshot capture failed: {0}")]
    ScreenshotFailed(String),

    /// DOM snapshot failed
    #[error("HTML capture failed: {0}")]
    HtmlFailed(String),
}

/// Result type alias for site-ia operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}
