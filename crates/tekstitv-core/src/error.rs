use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::page::PageId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid page number: {0}")]
    InvalidPage(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fetch failure classification for a single page request.
///
/// Carried in navigation state rather than propagated with `?` -- the
/// controller's public operations never fail, they report through the
/// `error` field (a failed fetch leaves the previous content on screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageErrorKind {
    /// The page/subpage combination does not exist (HTTP 404).
    NotFound,
    /// Transport-level failure (connect, timeout, TLS).
    Network,
    /// Anything else (unexpected status, malformed body).
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub kind: PageErrorKind,
    pub page: PageId,
}

impl PageError {
    pub fn new(kind: PageErrorKind, page: PageId) -> Self {
        Self { kind, page }
    }
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            PageErrorKind::NotFound => write!(f, "page {} not found", self.page),
            PageErrorKind::Network => write!(f, "network error fetching page {}", self.page),
            PageErrorKind::Unknown => write!(f, "failed to fetch page {}", self.page),
        }
    }
}
