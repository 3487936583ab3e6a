//! Common test utilities

use std::sync::Arc;
use std::time::Duration;

use trendscope::crawler::fetcher::HttpFetcher;
use trendscope::crawler::TopicCrawler;
use trendscope::parser::SelectorExtractor;
use trendscope::utils::delay::RecordingDelay;
use url::Url;

/// Load an HTML fixture from `tests/fixtures/html`
#[allow(dead_code)]
pub fn load_fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/html")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("missing fixture {}: {e}", path.display()))
}

/// Crawler fetching over HTTP from `base`, recording pauses instead of sleeping
#[allow(dead_code)]
pub fn http_crawler(base: &str, delay: Arc<RecordingDelay>) -> TopicCrawler {
    TopicCrawler::new(
        Arc::new(HttpFetcher::new(Duration::from_secs(5)).unwrap()),
        Arc::new(SelectorExtractor::default()),
        delay,
        Url::parse(base).unwrap(),
        Duration::from_secs(1),
    )
}

/// Minimal HTML page with the given topic links as `(href, label)`
#[allow(dead_code)]
pub fn links_page(links: &[(&str, &str)]) -> String {
    let anchors: String = links
        .iter()
        .map(|(href, label)| format!(r#"<a href="{href}">{label}</a>"#))
        .collect();
    format!("<!DOCTYPE html><html><body><nav>{anchors}</nav></body></html>")
}
