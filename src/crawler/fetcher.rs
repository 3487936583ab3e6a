//! HTTP page fetcher
//!
//! This module provides the page fetcher used by the topic crawler with:
//! - User-Agent rotation
//! - Browser-like request headers
//! - Charset detection from the Content-Type header
//!
//! The fetcher does not retry. A failed page aborts the whole crawl, and the
//! pause before each request is taken by the crawler.

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT},
    Client, Response, StatusCode,
};
use std::time::Duration;
use url::Url;

use crate::config::CrawlerConfig;
use crate::utils::error::FetchError;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Source of page bodies for the crawler
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the decoded document text
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError>;
}

/// Fetches pages over HTTP with reqwest
pub struct HttpFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Fixed user agent; rotated from the pool when unset
    user_agent: Option<String>,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            user_agent: None,
        })
    }

    /// Create a fetcher from the `[crawler]` configuration section
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, FetchError> {
        let mut fetcher = Self::new(Duration::from_secs(config.request_timeout_secs))?;
        fetcher.user_agent = config.user_agent.clone();
        Ok(fetcher)
    }

    /// Decode response body honoring the declared charset
    async fn decode_response(&self, url: &Url, response: Response) -> Result<String, FetchError> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await?;

        let (text, encoding, had_errors) = decode_bytes(&bytes, &content_type);
        if had_errors {
            tracing::warn!(
                url = %url,
                encoding = encoding.name(),
                "Invalid bytes in page body, replaced"
            );
        }

        Ok(text)
    }

    /// Build HTTP headers for a page request
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let user_agent = self
            .user_agent
            .as_deref()
            .and_then(|ua| HeaderValue::from_str(ua).ok())
            .unwrap_or_else(|| HeaderValue::from_static(random_user_agent()));
        headers.insert(USER_AGENT, user_agent);

        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(
            ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate, br"),
        );

        headers
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        tracing::debug!(url = %url, "Fetching page");

        let response = self
            .client
            .get(url.clone())
            .headers(self.build_headers())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimit);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        self.decode_response(url, response).await
    }
}

/// Decode bytes to a UTF-8 string using the charset from `content_type`
///
/// Falls back to UTF-8 when no charset is declared or the label is unknown.
/// Malformed sequences become U+FFFD; the returned flag reports whether any
/// were replaced.
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> (String, &'static Encoding, bool) {
    let encoding = charset_label(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (cow, used, had_errors) = encoding.decode(bytes);
    (cow.into_owned(), used, had_errors)
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_ascii_lowercase())
        } else {
            None
        }
    })
}

/// Get a random user agent from the pool
fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
}
