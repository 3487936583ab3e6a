//! trendscope - Trend topic crawler with search-interest growth ranking
//!
//! Crawls a site's trend topic hierarchy, cleans the scraped topic names and
//! ranks every topic by how much its search interest grew recently.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Recursive topic crawl with a visited set and politeness pauses
//! - [`parser`] - Card and topic link extraction from HTML
//! - [`topics`] - Name cleaning, tree normalization and name extraction
//! - [`trends`] - Search-interest service client
//! - [`analytics`] - Batched growth analysis
//! - [`pipeline`] - End-to-end runs
//! - [`models`] - Core data structures and types
//! - [`utils`] - Delays, retries and crawl errors
//!
//! # Example
//!
//! ```no_run
//! use trendscope::analytics::BatchAnalyzer;
//! use trendscope::config::Config;
//! use trendscope::crawler::TopicCrawler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let crawler = TopicCrawler::from_config(&config)?;
//!     let analyzer = BatchAnalyzer::from_config(&config.trends)?;
//!     let (_, report) = trendscope::pipeline::run(
//!         &crawler,
//!         &analyzer,
//!         &config.crawler.start_path,
//!         config.crawler.max_depth,
//!     )
//!     .await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod topics;
pub mod trends;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analytics::{AnalysisError, BatchAnalyzer};
    pub use crate::config::Config;
    pub use crate::crawler::TopicCrawler;
    pub use crate::error::{Error, ErrorCategory, Result, TrendscopeErrorTrait};
    pub use crate::models::{Item, TopicNode, TrendRecord, TrendReport};
    pub use crate::trends::{GoogleTrendsClient, TrendsService};
}

// Direct re-exports for convenience
pub use models::{Item, TopicNode, TrendRecord, TrendReport};
