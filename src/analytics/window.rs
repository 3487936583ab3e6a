//! Early/recent window averages over an interest table

use chrono::{DateTime, Duration, Utc};

use super::AnalysisError;
use crate::models::TrendRecord;
use crate::trends::InterestTable;

/// Mean interest of one query before and after a cutoff date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowAverages {
    pub early: f64,
    pub recent: f64,
}

/// Start of the recent window: `recent_days` before the latest date
///
/// `None` for an empty table or a window reaching outside the date range.
#[must_use]
pub fn cutoff_date(table: &InterestTable, recent_days: i64) -> Option<DateTime<Utc>> {
    let latest = table.max_date()?;
    latest.checked_sub_signed(Duration::try_days(recent_days)?)
}

/// Averages of column `index`, split at `cutoff`
///
/// Rows dated strictly before the cutoff are early, the rest recent. An empty
/// window averages to 0.
#[must_use]
pub fn window_averages(table: &InterestTable, index: usize, cutoff: DateTime<Utc>) -> WindowAverages {
    let (mut early_sum, mut early_n) = (0.0, 0usize);
    let (mut recent_sum, mut recent_n) = (0.0, 0usize);

    for row in table.rows() {
        let Some(value) = row.values.get(index) else {
            continue;
        };
        if row.date < cutoff {
            early_sum += value;
            early_n += 1;
        } else {
            recent_sum += value;
            recent_n += 1;
        }
    }

    WindowAverages {
        early: mean(early_sum, early_n),
        recent: mean(recent_sum, recent_n),
    }
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// One record per query of a batch
///
/// # Errors
///
/// `AnalysisError::NoData` for a table without rows, and
/// `AnalysisError::MissingColumn` when a query has no column in the table
pub fn batch_records(
    batch: usize,
    queries: &[String],
    table: &InterestTable,
    recent_days: i64,
) -> Result<Vec<TrendRecord>, AnalysisError> {
    let cutoff = cutoff_date(table, recent_days).ok_or(AnalysisError::NoData { batch })?;

    queries
        .iter()
        .map(|query| {
            let index = table
                .column(query)
                .ok_or_else(|| AnalysisError::MissingColumn {
                    batch,
                    query: query.clone(),
                })?;
            let averages = window_averages(table, index, cutoff);
            Ok(TrendRecord::from_averages(
                query.clone(),
                averages.early,
                averages.recent,
            ))
        })
        .collect()
}
