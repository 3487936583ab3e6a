//! Batched trend analysis against a rate-limited trends service

use std::sync::Arc;

use crate::config::TrendsConfig;
use crate::models::{TrendRecord, TrendReport};
use crate::trends::{GoogleTrendsClient, InterestTable, TrendsError, TrendsService};
use crate::utils::delay::{Delay, DelayKind, TokioDelay};
use crate::utils::retry::{with_retry_if, RetryError, RetryPolicy};

use super::window::batch_records;
use super::AnalysisError;

/// Queries a trends service in fixed-size batches
///
/// Batches run strictly one after another. Inside a batch each attempt pauses
/// before both service calls; a rate-limited attempt is retried after the
/// retry delay, any other failure ends the analysis.
pub struct BatchAnalyzer {
    service: Arc<dyn TrendsService>,
    delay: Arc<dyn Delay>,
    config: TrendsConfig,
}

impl BatchAnalyzer {
    pub fn new(service: Arc<dyn TrendsService>, delay: Arc<dyn Delay>, config: TrendsConfig) -> Self {
        Self {
            service,
            delay,
            config,
        }
    }

    /// Create an analyzer backed by Google Trends
    ///
    /// # Errors
    ///
    /// Returns `TrendsError` if the HTTP client cannot be created
    pub fn from_config(config: &TrendsConfig) -> Result<Self, TrendsError> {
        let client = GoogleTrendsClient::from_config(config)?;
        Ok(Self::new(
            Arc::new(client),
            Arc::new(TokioDelay),
            config.clone(),
        ))
    }

    /// Split `names` into consecutive batches of the configured size
    #[must_use]
    pub fn batches<'a>(&self, names: &'a [String]) -> Vec<&'a [String]> {
        names
            .chunks(self.config.batch_size.max(1))
            .filter(|batch| !batch.is_empty())
            .collect()
    }

    /// Analyze every name and return the records sorted by growth
    ///
    /// # Errors
    ///
    /// The first failing batch aborts the whole analysis; records of earlier
    /// batches are discarded.
    pub async fn analyze(&self, names: &[String]) -> Result<TrendReport, AnalysisError> {
        let batches = self.batches(names);
        let total = batches.len();
        tracing::info!(names = names.len(), batches = total, "Starting trend analysis");

        let mut records = Vec::with_capacity(names.len());
        for (index, queries) in batches.into_iter().enumerate() {
            let batch = index + 1;
            tracing::info!(batch, total, size = queries.len(), "Analyzing batch");

            match self.analyze_batch(batch, queries).await {
                Ok(batch_records) => records.extend(batch_records),
                Err(e) => {
                    tracing::error!(batch, error = %e, "Trend analysis aborted");
                    return Err(e);
                }
            }

            if batch < total {
                self.delay
                    .pause(DelayKind::InterBatch, self.config.inter_batch_delay())
                    .await;
            }
        }

        tracing::info!(records = records.len(), "Completed trend analysis");
        Ok(TrendReport::new(records))
    }

    async fn analyze_batch(
        &self,
        batch: usize,
        queries: &[String],
    ) -> Result<Vec<TrendRecord>, AnalysisError> {
        let policy = RetryPolicy::new(self.config.max_retries, self.config.retry_delay());

        let table = with_retry_if(
            &policy,
            self.delay.as_ref(),
            |attempt| self.fetch_interest(batch, attempt, queries),
            TrendsError::is_rate_limited,
        )
        .await
        .map_err(|e| match e {
            RetryError::Exhausted { attempts, .. } => {
                AnalysisError::RateLimitExhausted { batch, attempts }
            }
            RetryError::Aborted { error, .. } => AnalysisError::Service {
                batch,
                source: error,
            },
        })?;

        if table.is_empty() {
            return Err(AnalysisError::NoData { batch });
        }

        batch_records(batch, queries, &table, self.config.recent_window_days)
    }

    async fn fetch_interest(
        &self,
        batch: usize,
        attempt: u32,
        queries: &[String],
    ) -> Result<InterestTable, TrendsError> {
        tracing::debug!(batch, attempt, "Requesting interest over time");

        self.delay
            .pause(DelayKind::Request, self.config.request_delay())
            .await;
        self.service
            .build_payload(queries, &self.config.timeframe, &self.config.geo)
            .await?;

        self.delay
            .pause(DelayKind::Request, self.config.request_delay())
            .await;
        self.service.interest_over_time().await
    }
}
