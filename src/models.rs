// Core data structures for the trendscope pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::utils::truncate_text;

/// One scraped content card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Item {
    pub image_url: String,
    pub alt_text: String,
    pub title: String,
    pub description: String,
}

/// One level of the crawled topic hierarchy
///
/// A node without children carries an empty `subtopics` map, never a missing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TopicNode {
    /// Display name; empty for the synthetic crawl root
    #[serde(default)]
    pub name: String,

    /// Cards found on this topic's page
    #[serde(default)]
    pub items: Vec<Item>,

    /// Child topics keyed by display name
    #[serde(default)]
    pub subtopics: BTreeMap<String, TopicNode>,
}

impl TopicNode {
    /// Create an empty node with the given name
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// True when the node has neither items nor children
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.items.is_empty() && self.subtopics.is_empty()
    }

    /// Number of nodes below this one, at any depth
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.subtopics
            .values()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Number of items in this node and every descendant
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.items.len()
            + self
                .subtopics
                .values()
                .map(TopicNode::total_items)
                .sum::<usize>()
    }
}

/// Early/recent search interest for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub query: String,
    pub avg_early: f64,
    pub avg_recent: f64,
    pub growth_pct: f64,
}

impl TrendRecord {
    /// Build a record, computing growth from the two averages
    ///
    /// A zero (or negative) baseline yields zero growth.
    pub fn from_averages(query: impl Into<String>, avg_early: f64, avg_recent: f64) -> Self {
        Self {
            query: query.into(),
            avg_early,
            avg_recent,
            growth_pct: growth_percent(avg_early, avg_recent),
        }
    }
}

/// Percentage change from `early` to `recent`; 0 when `early` is not positive
#[must_use]
pub fn growth_percent(early: f64, recent: f64) -> f64 {
    if early > 0.0 {
        (recent - early) / early * 100.0
    } else {
        0.0
    }
}

/// Trend records ranked by growth, highest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TrendReport {
    records: Vec<TrendRecord>,
}

impl TrendReport {
    /// Rank the records descending by growth
    ///
    /// The sort is stable, so ties keep their collection order.
    pub fn new(mut records: Vec<TrendRecord>) -> Self {
        records.sort_by(|a, b| b.growth_pct.total_cmp(&a.growth_pct));
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[TrendRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

const QUERY_COLUMN_MAX: usize = 40;

impl fmt::Display for TrendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queries: Vec<String> = self
            .records
            .iter()
            .map(|r| truncate_text(&r.query, QUERY_COLUMN_MAX))
            .collect();
        let width = queries
            .iter()
            .map(|q| q.chars().count())
            .max()
            .unwrap_or(0)
            .max("Query".len());

        writeln!(
            f,
            "{:<width$}  {:>10}  {:>10}  {:>10}",
            "Query", "Avg_Early", "Avg_Recent", "Growth_%"
        )?;
        for (record, query) in self.records.iter().zip(&queries) {
            writeln!(
                f,
                "{:<width$}  {:>10.2}  {:>10.2}  {:>10.2}",
                query, record.avg_early, record.avg_recent, record.growth_pct
            )?;
        }
        Ok(())
    }
}
