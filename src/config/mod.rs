//! Configuration management for the trendscope pipeline
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Defaults reproduce the crawl and analysis
//! constants the pipeline was tuned with.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::parser::selectors;

/// Upper bound for `recent_window_days` (ten years)
const MAX_RECENT_WINDOW_DAYS: i64 = 3650;

/// Upper bound for the trends pauses, in seconds
const MAX_TRENDS_DELAY_SECS: u64 = 3600;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Card and link selectors
    pub extraction: ExtractionConfig,

    /// Trends service configuration
    pub trends: TrendsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Site root used to resolve relative topic links
    pub base_url: String,

    /// Page the crawl starts from, relative to `base_url` or absolute
    pub start_path: String,

    /// Deepest level whose links are still followed
    pub max_depth: u32,

    /// Pause before every page fetch, in milliseconds
    pub politeness_delay_ms: u64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Fixed user agent; a browser agent is rotated when unset
    pub user_agent: Option<String>,
}

/// Selectors describing where cards and topic links live on a page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Container of a single content card
    pub card_selector: String,

    /// Image inside a card; cards without one are skipped
    pub image_selector: String,

    /// Card title
    pub title_selector: String,

    /// Card description
    pub description_selector: String,

    /// Anchors considered as topic links
    pub link_selector: String,

    /// Path prefix a topic link must start with
    pub link_prefix: String,
}

/// Trends service and batch analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendsConfig {
    /// Service root
    pub endpoint: String,

    /// Interface language sent with every request
    pub hl: String,

    /// Timezone offset in minutes
    pub tz: i32,

    /// Query timeframe
    pub timeframe: String,

    /// Geography filter; empty for worldwide
    pub geo: String,

    /// Queries submitted per batch
    pub batch_size: usize,

    /// Attempts per batch before the analysis is aborted
    pub max_retries: u32,

    /// Pause after a rate-limit rejection, in seconds
    pub retry_delay_secs: u64,

    /// Pause before each service call, in seconds
    pub request_delay_secs: u64,

    /// Length of the recent window, in days
    pub recent_window_days: i64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://www.pinterest.com"),
            start_path: String::from("/trends/"),
            max_depth: 2,
            politeness_delay_ms: 1000,
            request_timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            card_selector: String::from(selectors::DEFAULT_CARD_SELECTOR),
            image_selector: String::from(selectors::DEFAULT_IMAGE_SELECTOR),
            title_selector: String::from(selectors::DEFAULT_TITLE_SELECTOR),
            description_selector: String::from(selectors::DEFAULT_DESCRIPTION_SELECTOR),
            link_selector: String::from(selectors::DEFAULT_LINK_SELECTOR),
            link_prefix: String::from(selectors::DEFAULT_LINK_PREFIX),
        }
    }
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("https://trends.google.com"),
            hl: String::from("en-US"),
            tz: 360,
            timeframe: String::from("today 3-m"),
            geo: String::new(),
            batch_size: 5,
            max_retries: 3,
            retry_delay_secs: 60,
            request_delay_secs: 2,
            recent_window_days: 15,
            request_timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("TRENDSCOPE_BASE_URL") {
            config.crawler.base_url = base_url;
        }
        if let Ok(start_path) = std::env::var("TRENDSCOPE_START_PATH") {
            config.crawler.start_path = start_path;
        }
        if let Some(max_depth) = env_parse("TRENDSCOPE_MAX_DEPTH") {
            config.crawler.max_depth = max_depth;
        }
        if let Some(delay) = env_parse("TRENDSCOPE_POLITENESS_DELAY_MS") {
            config.crawler.politeness_delay_ms = delay;
        }
        if let Some(timeout) = env_parse("TRENDSCOPE_REQUEST_TIMEOUT") {
            config.crawler.request_timeout_secs = timeout;
            config.trends.request_timeout_secs = timeout;
        }
        config.crawler.user_agent = std::env::var("TRENDSCOPE_USER_AGENT").ok();

        if let Ok(endpoint) = std::env::var("TRENDSCOPE_TRENDS_ENDPOINT") {
            config.trends.endpoint = endpoint;
        }
        if let Ok(geo) = std::env::var("TRENDSCOPE_TRENDS_GEO") {
            config.trends.geo = geo;
        }
        if let Ok(timeframe) = std::env::var("TRENDSCOPE_TRENDS_TIMEFRAME") {
            config.trends.timeframe = timeframe;
        }
        if let Some(batch_size) = env_parse("TRENDSCOPE_BATCH_SIZE") {
            config.trends.batch_size = batch_size;
        }
        if let Some(max_retries) = env_parse("TRENDSCOPE_MAX_RETRIES") {
            config.trends.max_retries = max_retries;
        }
        if let Some(delay) = env_parse("TRENDSCOPE_RETRY_DELAY") {
            config.trends.retry_delay_secs = delay;
        }
        if let Some(delay) = env_parse("TRENDSCOPE_REQUEST_DELAY") {
            config.trends.request_delay_secs = delay;
        }

        if let Ok(level) = std::env::var("TRENDSCOPE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("TRENDSCOPE_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.crawler.base_url)
            .with_context(|| format!("base_url is not an absolute URL: {}", self.crawler.base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("base_url cannot be used as a base: {}", self.crawler.base_url);
        }
        self.start_url()?;

        if !self.extraction.link_prefix.starts_with('/') {
            anyhow::bail!(
                "link_prefix must be an absolute path: '{}'",
                self.extraction.link_prefix
            );
        }

        if self.trends.batch_size == 0 {
            anyhow::bail!("batch_size must be greater than 0");
        }

        if self.trends.max_retries == 0 {
            anyhow::bail!("max_retries must be greater than 0");
        }

        if !(1..=MAX_RECENT_WINDOW_DAYS).contains(&self.trends.recent_window_days) {
            anyhow::bail!(
                "recent_window_days must be between 1 and {MAX_RECENT_WINDOW_DAYS}, got {}",
                self.trends.recent_window_days
            );
        }

        for (key, secs) in [
            ("request_delay_secs", self.trends.request_delay_secs),
            ("retry_delay_secs", self.trends.retry_delay_secs),
        ] {
            if secs > MAX_TRENDS_DELAY_SECS {
                anyhow::bail!("{key} must be at most {MAX_TRENDS_DELAY_SECS}, got {secs}");
            }
        }

        Url::parse(&self.trends.endpoint)
            .with_context(|| format!("Invalid trends endpoint: {}", self.trends.endpoint))?;

        Ok(())
    }

    /// Crawl root resolved against the base URL
    pub fn start_url(&self) -> Result<Url> {
        let base = Url::parse(&self.crawler.base_url).context("Invalid base_url")?;
        base.join(&self.crawler.start_path)
            .with_context(|| format!("Invalid start_path: {}", self.crawler.start_path))
    }

    /// Get crawler request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }

    /// Get the pause taken before every page fetch
    #[must_use]
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.crawler.politeness_delay_ms)
    }
}

impl TrendsConfig {
    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Pause between two consecutive batches
    #[must_use]
    pub fn inter_batch_delay(&self) -> Duration {
        self.request_delay() * 2
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
