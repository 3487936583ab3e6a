//! Recursive topic hierarchy crawler
//!
//! This module walks a site's trend pages depth-first, collecting the cards
//! on every page and following topic links down to a fixed depth. Fetching is
//! strictly sequential with a politeness pause before every request.

pub mod fetcher;
pub mod url;

use futures::future::BoxFuture;
use scraper::Html;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use ::url::Url;

use crate::config::Config;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::models::{Item, TopicNode};
use crate::parser::{PageExtractor, SelectorExtractor, TopicLink};
use crate::utils::delay::{Delay, DelayKind, TokioDelay};
use crate::utils::error::CrawlError;

/// State shared by every recursive call of one crawl
///
/// One context lives for exactly one top-level crawl.
#[derive(Debug, Default)]
pub struct CrawlContext {
    visited: HashSet<Url>,
    pages_fetched: usize,
}

impl CrawlContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url` as visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.clone())
    }

    #[must_use]
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

/// Outcome of a top-level crawl
#[derive(Debug, Clone)]
pub struct CrawlOutput {
    /// Root node; its subtopics are the top-level topics
    pub root: TopicNode,

    /// Pages actually fetched
    pub pages_fetched: usize,
}

/// Topic hierarchy crawler
pub struct TopicCrawler {
    /// Page source
    fetcher: Arc<dyn PageFetcher>,

    /// Card and link extraction strategy
    extractor: Arc<dyn PageExtractor>,

    /// Pause implementation
    delay: Arc<dyn Delay>,

    /// Site root for resolving topic links
    base_url: Url,

    /// Pause before every fetch
    politeness_delay: Duration,
}

impl TopicCrawler {
    /// Create a crawler from explicit collaborators
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn PageExtractor>,
        delay: Arc<dyn Delay>,
        base_url: Url,
        politeness_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            delay,
            base_url,
            politeness_delay,
        }
    }

    /// Create a crawler fetching over HTTP with the configured selectors
    ///
    /// # Errors
    ///
    /// Returns `CrawlError` if the base URL, a selector or the HTTP client is invalid
    pub fn from_config(config: &Config) -> Result<Self, CrawlError> {
        let base_url = Url::parse(&config.crawler.base_url)
            .map_err(|e| CrawlError::InvalidStartUrl(format!("{}: {e}", config.crawler.base_url)))?;
        let fetcher = HttpFetcher::from_config(&config.crawler).map_err(CrawlError::Client)?;
        let extractor = SelectorExtractor::from_config(&config.extraction)?;

        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(extractor),
            Arc::new(TokioDelay),
            base_url,
            config.politeness_delay(),
        ))
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Crawl from `start` down to `max_depth`
    ///
    /// The root page is fetched at depth 0. Links are followed only from pages
    /// above `max_depth`, so `max_depth = 0` fetches the root alone.
    ///
    /// # Errors
    ///
    /// Any fetch failure aborts the crawl; no partial tree is returned.
    pub async fn crawl(&self, start: &str, max_depth: u32) -> Result<CrawlOutput, CrawlError> {
        let start_url = self
            .base_url
            .join(start)
            .map_err(|e| CrawlError::InvalidStartUrl(format!("{start}: {e}")))?;

        tracing::info!(start = %start_url, max_depth, "Starting topic crawl");

        let mut ctx = CrawlContext::new();
        let root = self
            .crawl_node(start_url, String::new(), 0, max_depth, &mut ctx)
            .await?;

        tracing::info!(
            pages = ctx.pages_fetched(),
            visited = ctx.visited_count(),
            topics = root.descendant_count(),
            items = root.total_items(),
            "Completed topic crawl"
        );

        Ok(CrawlOutput {
            root,
            pages_fetched: ctx.pages_fetched(),
        })
    }

    /// Crawl one page and, recursively, the topics it links to
    ///
    /// `url` is marked visited before anything else happens.
    pub fn crawl_node<'a>(
        &'a self,
        url: Url,
        name: String,
        depth: u32,
        max_depth: u32,
        ctx: &'a mut CrawlContext,
    ) -> BoxFuture<'a, Result<TopicNode, CrawlError>> {
        Box::pin(async move {
            ctx.mark_visited(&url);

            if depth > max_depth {
                return Ok(TopicNode::empty(name));
            }

            tracing::debug!(url = %url, depth, "Scanning page");
            self.delay
                .pause(DelayKind::Politeness, self.politeness_delay)
                .await;

            let html = self
                .fetcher
                .fetch_page(&url)
                .await
                .map_err(|source| CrawlError::Fetch {
                    url: url.to_string(),
                    source,
                })?;
            ctx.pages_fetched += 1;

            let (items, links) = self.extract_page(&html);
            tracing::debug!(
                url = %url,
                items = items.len(),
                links = links.len(),
                "Extracted page"
            );

            let mut node = TopicNode {
                name,
                items,
                ..Default::default()
            };

            if depth >= max_depth {
                return Ok(node);
            }

            for link in links {
                if ctx.is_visited(&link.url) {
                    tracing::trace!(url = %link.url, "Skipping visited link");
                    continue;
                }

                let child = self
                    .crawl_node(link.url, link.name.clone(), depth + 1, max_depth, ctx)
                    .await?;
                node.subtopics.insert(link.name, child);
            }

            Ok(node)
        })
    }

    // The parsed document is not Send, so it must not live across an await.
    fn extract_page(&self, html: &str) -> (Vec<Item>, Vec<TopicLink>) {
        let document = Html::parse_document(html);
        let items = self.extractor.extract_items(&document);
        let links = self.extractor.extract_links(&document, &self.base_url);
        (items, links)
    }
}
