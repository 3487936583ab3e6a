//! CSS selectors for topic pages
//!
//! The default selectors match the trend pages the crawler was written for.
//! Sites restyle their markup without notice, so every selector can be
//! overridden from the `[extraction]` configuration section.

use lazy_static::lazy_static;
use scraper::Selector;

use crate::config::ExtractionConfig;
use crate::utils::error::ExtractError;

pub const DEFAULT_CARD_SELECTOR: &str = r#"div[data-test-id="pinWrapper"]"#;
pub const DEFAULT_IMAGE_SELECTOR: &str = "img";
pub const DEFAULT_TITLE_SELECTOR: &str = "h3";
pub const DEFAULT_DESCRIPTION_SELECTOR: &str = r#"div[data-test-id="pinDescription"]"#;
pub const DEFAULT_LINK_SELECTOR: &str = "a[href]";
pub const DEFAULT_LINK_PREFIX: &str = "/trends/";

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", stringify!($s)))
    };
}

lazy_static! {
    static ref CARD: Selector = parse_selector!(DEFAULT_CARD_SELECTOR);
    static ref IMAGE: Selector = parse_selector!(DEFAULT_IMAGE_SELECTOR);
    static ref TITLE: Selector = parse_selector!(DEFAULT_TITLE_SELECTOR);
    static ref DESCRIPTION: Selector = parse_selector!(DEFAULT_DESCRIPTION_SELECTOR);
    static ref LINK: Selector = parse_selector!(DEFAULT_LINK_SELECTOR);
}

/// Compiled selectors for one crawl
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub card: Selector,
    pub image: Selector,
    pub title: Selector,
    pub description: Selector,
    pub link: Selector,
    pub link_prefix: String,
}

impl PageSelectors {
    pub fn new() -> Self {
        Self {
            card: CARD.clone(),
            image: IMAGE.clone(),
            title: TITLE.clone(),
            description: DESCRIPTION.clone(),
            link: LINK.clone(),
            link_prefix: DEFAULT_LINK_PREFIX.to_string(),
        }
    }

    /// Compile the selectors named in the configuration
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::InvalidSelector` naming the first selector that
    /// does not parse, or `ExtractError::InvalidLinkPrefix` for a prefix that
    /// is not an absolute path.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractError> {
        if !config.link_prefix.starts_with('/') {
            return Err(ExtractError::InvalidLinkPrefix(config.link_prefix.clone()));
        }

        Ok(Self {
            card: compile("card_selector", &config.card_selector)?,
            image: compile("image_selector", &config.image_selector)?,
            title: compile("title_selector", &config.title_selector)?,
            description: compile("description_selector", &config.description_selector)?,
            link: compile("link_selector", &config.link_selector)?,
            link_prefix: config.link_prefix.clone(),
        })
    }
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(field: &'static str, selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|_| ExtractError::InvalidSelector {
        field,
        selector: selector.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selectors_match_default_config() {
        let from_config = PageSelectors::from_config(&ExtractionConfig::default()).unwrap();
        let defaults = PageSelectors::default();
        assert_eq!(from_config.link_prefix, defaults.link_prefix);

        let html = scraper::Html::parse_fragment(
            r#"<div data-test-id="pinWrapper"><img src="a.jpg"></div>"#,
        );
        assert_eq!(html.select(&from_config.card).count(), 1);
        assert_eq!(html.select(&defaults.card).count(), 1);
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let config = ExtractionConfig {
            title_selector: String::from("h3[["),
            ..Default::default()
        };
        let err = PageSelectors::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::InvalidSelector {
                field: "title_selector",
                ..
            }
        ));
    }

    #[test]
    fn test_relative_link_prefix_rejected() {
        let config = ExtractionConfig {
            link_prefix: String::from("trends/"),
            ..Default::default()
        };
        assert!(matches!(
            PageSelectors::from_config(&config),
            Err(ExtractError::InvalidLinkPrefix(_))
        ));
    }
}
