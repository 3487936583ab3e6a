//! HTML parsing and data extraction
//!
//! This module turns a fetched topic page into the cards shown on it and the
//! topic links leading deeper into the hierarchy. The extraction contract is
//! the [`PageExtractor`] trait; [`SelectorExtractor`] implements it with CSS
//! selectors taken from the configuration.

pub mod selectors;

pub use selectors::PageSelectors;

use scraper::{ElementRef, Html};
use url::Url;

use crate::config::ExtractionConfig;
use crate::crawler::url::{canonicalize, is_topic_href, trailing_segment};
use crate::models::Item;
use crate::utils::error::ExtractError;
use crate::utils::normalize_whitespace;

/// Outgoing link to another topic page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicLink {
    /// Canonical absolute URL
    pub url: Url,

    /// Display name used as the child key
    pub name: String,
}

/// Strategy for pulling cards and topic links out of a page
pub trait PageExtractor: Send + Sync {
    /// Cards on the page, in document order
    fn extract_items(&self, document: &Html) -> Vec<Item>;

    /// Topic links on the page, in document order, resolved against `base`
    ///
    /// Duplicates are kept; the crawler deduplicates by URL.
    fn extract_links(&self, document: &Html, base: &Url) -> Vec<TopicLink>;
}

/// Selector-driven extraction
#[derive(Debug, Clone, Default)]
pub struct SelectorExtractor {
    selectors: PageSelectors,
}

impl SelectorExtractor {
    #[must_use]
    pub fn new(selectors: PageSelectors) -> Self {
        Self { selectors }
    }

    /// Build the extractor from the `[extraction]` configuration section
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` if a selector does not parse
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractError> {
        Ok(Self::new(PageSelectors::from_config(config)?))
    }

    fn extract_item(&self, card: ElementRef<'_>) -> Option<Item> {
        let image = card.select(&self.selectors.image).next()?;

        let title = card
            .select(&self.selectors.title)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();
        let description = card
            .select(&self.selectors.description)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();

        Some(Item {
            image_url: image.value().attr("src").unwrap_or_default().to_string(),
            alt_text: image.value().attr("alt").unwrap_or_default().to_string(),
            title,
            description,
        })
    }
}

impl PageExtractor for SelectorExtractor {
    fn extract_items(&self, document: &Html) -> Vec<Item> {
        document
            .select(&self.selectors.card)
            .filter_map(|card| self.extract_item(card))
            .collect()
    }

    fn extract_links(&self, document: &Html, base: &Url) -> Vec<TopicLink> {
        let prefix = self.selectors.link_prefix.as_str();

        document
            .select(&self.selectors.link)
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                if !is_topic_href(href, prefix) {
                    return None;
                }

                let url = canonicalize(base, href)?;
                let mut name = stripped_text(anchor);
                if name.is_empty() {
                    name = trailing_segment(href);
                }

                Some(TopicLink { url, name })
            })
            .collect()
    }
}

/// Text content with every text node trimmed and joined without separator
///
/// Markup such as `<span>Brat summer</span><span>95</span><span>Pins</span>`
/// therefore yields `Brat summer95Pins`, which the name cleaners expect.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
