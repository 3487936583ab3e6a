//! Search-interest time series from an external trends service
//!
//! The service is driven in two steps: a query set is submitted with
//! [`TrendsService::build_payload`], then its interest-over-time table is read
//! with [`TrendsService::interest_over_time`].

pub mod google;

pub use google::GoogleTrendsClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a trends service
#[derive(Debug, Error)]
pub enum TrendsError {
    /// The service rejected the call for sending too many requests
    #[error("Too many requests to the trends service")]
    RateLimited,

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status other than rate limiting
    #[error("Trends service responded with status {0}")]
    Status(u16),

    /// Response body could not be understood
    #[error("Malformed trends response: {0}")]
    MalformedResponse(String),

    /// `interest_over_time` was called before `build_payload`
    #[error("No query payload has been built")]
    NoPayload,
}

impl TrendsError {
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// One date of an interest table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestRow {
    pub date: DateTime<Utc>,

    /// One value per query column, in column order
    pub values: Vec<f64>,
}

/// Interest over time: rows are dates, columns are queries
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterestTable {
    queries: Vec<String>,
    rows: Vec<InterestRow>,
}

impl InterestTable {
    /// Create a table for the given query columns
    pub fn new(queries: Vec<String>) -> Self {
        Self {
            queries,
            rows: Vec::new(),
        }
    }

    /// Append a row
    ///
    /// # Errors
    ///
    /// Returns `TrendsError::MalformedResponse` if the row width does not
    /// match the number of query columns
    pub fn push_row(&mut self, date: DateTime<Utc>, values: Vec<f64>) -> Result<(), TrendsError> {
        if values.len() != self.queries.len() {
            return Err(TrendsError::MalformedResponse(format!(
                "row for {date} has {} values, expected {}",
                values.len(),
                self.queries.len()
            )));
        }
        self.rows.push(InterestRow { date, values });
        Ok(())
    }

    #[must_use]
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    #[must_use]
    pub fn rows(&self) -> &[InterestRow] {
        &self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column holding `query`
    #[must_use]
    pub fn column(&self, query: &str) -> Option<usize> {
        self.queries.iter().position(|q| q == query)
    }

    /// Latest date in the table
    #[must_use]
    pub fn max_date(&self) -> Option<DateTime<Utc>> {
        self.rows.iter().map(|row| row.date).max()
    }
}

/// Two-step client of a search-interest service
#[async_trait]
pub trait TrendsService: Send + Sync {
    /// Submit the query set for the following `interest_over_time` call
    async fn build_payload(
        &self,
        queries: &[String],
        timeframe: &str,
        geo: &str,
    ) -> Result<(), TrendsError>;

    /// Interest over time for the last submitted query set
    async fn interest_over_time(&self) -> Result<InterestTable, TrendsError>;
}
