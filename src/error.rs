//! Unified error handling for the trendscope crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`TrendscopeErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust
//! use trendscope::error::{Error, ErrorCategory, TrendscopeErrorTrait};
//! use trendscope::trends::TrendsError;
//!
//! let err = Error::from(TrendsError::RateLimited);
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), ErrorCategory::Service);
//! ```

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::analytics::AnalysisError;
pub use crate::trends::TrendsError;
pub use crate::utils::error::{CrawlError, ExtractError, FetchError};

/// Common trait for all trendscope error types
pub trait TrendscopeErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Configuration and validation errors
    Config,
    /// Trends service errors
    Service,
    /// Other/unknown errors
    Other,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Parsing => write!(f, "parsing"),
            Self::Config => write!(f, "config"),
            Self::Service => write!(f, "service"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Unified error type for the trendscope crate
#[derive(Error, Debug)]
pub enum Error {
    /// Crawl errors (fetch failures, bad start URL)
    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Extraction strategy errors
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Trends service errors
    #[error("Trends error: {0}")]
    Trends(#[from] TrendsError),

    /// Trend analysis aborted
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TrendscopeErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        FetchError::is_recoverable(self)
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Network
    }
}

impl TrendscopeErrorTrait for CrawlError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch { source, .. } => source.is_recoverable(),
            Self::Client(_) | Self::InvalidStartUrl(_) | Self::Extract(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch { source, .. } => TrendscopeErrorTrait::category(source),
            Self::Client(_) | Self::InvalidStartUrl(_) | Self::Extract(_) => ErrorCategory::Config,
        }
    }
}

impl TrendscopeErrorTrait for TrendsError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::RateLimited | Self::Http(_) => true,
            Self::Status(code) => matches!(code, 500 | 502 | 503 | 504),
            Self::MalformedResponse(_) | Self::NoPayload => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) => ErrorCategory::Network,
            Self::MalformedResponse(_) => ErrorCategory::Parsing,
            Self::RateLimited | Self::Status(_) | Self::NoPayload => ErrorCategory::Service,
        }
    }
}

impl TrendscopeErrorTrait for AnalysisError {
    fn is_recoverable(&self) -> bool {
        match self {
            // A later run may get through once the limit lifts
            Self::RateLimitExhausted { .. } => true,
            Self::Service { source, .. } => source.is_recoverable(),
            Self::NoData { .. } | Self::MissingColumn { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Service { source, .. } => source.category(),
            Self::MissingColumn { .. } => ErrorCategory::Parsing,
            Self::RateLimitExhausted { .. } | Self::NoData { .. } => ErrorCategory::Service,
        }
    }
}

impl TrendscopeErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Crawl(e) => e.is_recoverable(),
            Self::Fetch(e) => TrendscopeErrorTrait::is_recoverable(e),
            Self::Extract(_) => false,
            Self::Trends(e) => e.is_recoverable(),
            Self::Analysis(e) => e.is_recoverable(),
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) => false,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Crawl(e) => e.category(),
            Self::Fetch(e) => e.category(),
            Self::Extract(_) | Self::Config(_) => ErrorCategory::Config,
            Self::Trends(e) => e.category(),
            Self::Analysis(e) => e.category(),
            Self::Io(_) => ErrorCategory::Other,
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
