use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Closed set of failure categories a page result can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The input could not be turned into an absolute URL with a host
    #[serde(rename = "InvalidURL")]
    InvalidUrl,
    /// The seed domain did not resolve
    DomainNotFound,
    /// Navigation exceeded its bound
    Timeout,
    /// The automation engine failed to launch or crashed mid-session
    BrowserError,
    /// A CDN or cloud edge refused the request
    HostingPlatformError,
    /// Anything else
    GenericScrapeFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "InvalidURL",
            ErrorKind::DomainNotFound => "DomainNotFound",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::BrowserError => "BrowserError",
            ErrorKind::HostingPlatformError => "HostingPlatformError",
            ErrorKind::GenericScrapeFailure => "GenericScrapeFailure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failure attached to a page result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl PageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }
}

/// Raw failures raised while preparing or fetching a page.
///
/// These never leave the crate: the classifier turns every one of them into a
/// [`PageError`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {input:?}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("domain {host} could not be resolved: {reason}")]
    Dns { host: String, reason: String },

    #[error("navigation to {url} timed out after {}s", .after.as_secs())]
    Timeout { url: String, after: Duration },

    #[error("browser session error: {0}")]
    Session(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("{url} responded with HTTP {status}")]
    HttpStatus {
        url: String,
        status: u16,
        headers: BTreeMap<String, String>,
    },

    #[error("{0}")]
    Other(String),
}

impl From<fantoccini::error::NewSessionError> for FetchError {
    fn from(e: fantoccini::error::NewSessionError) -> Self {
        FetchError::Session(e.to_string())
    }
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
