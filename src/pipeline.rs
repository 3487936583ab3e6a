//! End-to-end runs: crawl, normalize, extract names, analyze

use std::collections::BTreeMap;

use crate::analytics::BatchAnalyzer;
use crate::crawler::TopicCrawler;
use crate::error::Result;
use crate::models::{TopicNode, TrendReport};
use crate::topics::{clean_crawled_tree, extract_topic_names};

/// Cleaned topic tree and the names found in it
#[derive(Debug, Clone)]
pub struct TopicCollection {
    pub topics: BTreeMap<String, TopicNode>,
    pub names: Vec<String>,
    pub pages_fetched: usize,
}

/// Crawl from `start`, clean the tree and list every topic name
///
/// Names are sorted so repeated runs print them in the same order.
pub async fn collect_topics(
    crawler: &TopicCrawler,
    start: &str,
    max_depth: u32,
) -> Result<TopicCollection> {
    let output = crawler.crawl(start, max_depth).await?;
    let topics = clean_crawled_tree(&output.root);

    let mut names = extract_topic_names(&topics);
    names.retain(|name| !name.is_empty());
    names.sort();

    tracing::info!(
        top_level = topics.len(),
        names = names.len(),
        pages = output.pages_fetched,
        "Collected topics"
    );

    Ok(TopicCollection {
        topics,
        names,
        pages_fetched: output.pages_fetched,
    })
}

/// Crawl topics and rank them by search-interest growth
pub async fn run(
    crawler: &TopicCrawler,
    analyzer: &BatchAnalyzer,
    start: &str,
    max_depth: u32,
) -> Result<(TopicCollection, TrendReport)> {
    let collection = collect_topics(crawler, start, max_depth).await?;
    let report = analyzer.analyze(&collection.names).await?;
    Ok((collection, report))
}
