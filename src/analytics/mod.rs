//! Trend analysis of topic names
//!
//! Names are submitted to the trends service in batches, and each query's
//! interest is compared between an early window and the most recent days.

pub mod batch;
pub mod window;

pub use batch::BatchAnalyzer;
pub use window::{batch_records, cutoff_date, window_averages, WindowAverages};

use thiserror::Error;

use crate::trends::TrendsError;

/// Reasons a trend analysis is abandoned
///
/// Batch numbers are 1-based.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Batch {batch} still rate limited after {attempts} attempts")]
    RateLimitExhausted { batch: usize, attempts: u32 },

    #[error("Batch {batch} failed: {source}")]
    Service {
        batch: usize,
        #[source]
        source: TrendsError,
    },

    #[error("Batch {batch} returned no data")]
    NoData { batch: usize },

    #[error("Batch {batch} has no column for query '{query}'")]
    MissingColumn { batch: usize, query: String },
}

impl AnalysisError {
    /// Batch that ended the analysis
    #[must_use]
    pub fn batch(&self) -> usize {
        match self {
            Self::RateLimitExhausted { batch, .. }
            | Self::Service { batch, .. }
            | Self::NoData { batch }
            | Self::MissingColumn { batch, .. } => *batch,
        }
    }
}
