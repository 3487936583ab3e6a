//! Error types for the trendscope crawler
//!
//! This module defines the error types raised while fetching and crawling
//! topic pages.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Non-success status code
    #[error("Request failed with status: {0}")]
    Status(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,
}

/// Errors raised while building the page extraction strategy
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A configured CSS selector could not be parsed
    #[error("Invalid selector for {field}: '{selector}'")]
    InvalidSelector { field: &'static str, selector: String },

    /// The topic link prefix is empty or not a path
    #[error("Invalid link prefix: '{0}'")]
    InvalidLinkPrefix(String),
}

/// General crawler errors
#[derive(Error, Debug)]
pub enum CrawlError {
    /// Fetching a page failed; the crawl is aborted
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] FetchError),

    /// The start URL could not be resolved against the base URL
    #[error("Invalid start URL: {0}")]
    InvalidStartUrl(String),

    /// Extraction strategy could not be built
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),
}

impl FetchError {
    /// Whether retrying the same request could succeed
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::RateLimit | Self::Timeout | Self::Http(_) => true,
            Self::Status(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_recoverable() {
        assert!(FetchError::Timeout.is_recoverable());
        assert!(FetchError::Status(503).is_recoverable());
        assert!(!FetchError::Status(404).is_recoverable());
    }

    #[test]
    fn test_crawl_error_display() {
        let err = CrawlError::Fetch {
            url: "https://example.com/trends/".into(),
            source: FetchError::Status(500),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch https://example.com/trends/: Request failed with status: 500"
        );
    }
}
