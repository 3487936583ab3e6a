//! Integration tests for the topic crawler against a mock site

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use common::{http_crawler, links_page, load_fixture};
use trendscope::analytics::BatchAnalyzer;
use trendscope::config::TrendsConfig;
use trendscope::pipeline::{self, collect_topics};
use trendscope::trends::{InterestTable, TrendsError, TrendsService};
use trendscope::utils::delay::{DelayKind, RecordingDelay};
use trendscope::utils::error::{CrawlError, FetchError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body.into())
}

async fn mount_page(server: &MockServer, page: &str, body: impl Into<String>, hits: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .expect(hits)
        .mount(server)
        .await;
}

/// Full site: two top-level topics, one with children and a cycle back up
async fn mount_site(server: &MockServer) {
    mount_page(server, "/trends/", load_fixture("trends_root.html"), 1).await;
    mount_page(server, "/trends/fashion/", load_fixture("trends_fashion.html"), 1).await;
    mount_page(server, "/trends/travel/", links_page(&[]), 1).await;
    mount_page(
        server,
        "/trends/fashion/brat-summer/",
        links_page(&[("/trends/fashion/", "Back to fashion")]),
        1,
    )
    .await;
    mount_page(server, "/trends/fashion/quiet-luxury/", links_page(&[]), 1).await;
}

#[tokio::test]
async fn test_crawl_builds_hierarchy() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let delay = Arc::new(RecordingDelay::new());
    let output = http_crawler(&server.uri(), delay.clone())
        .crawl("/trends/", 2)
        .await
        .unwrap();

    let root = &output.root;
    assert_eq!(root.items.len(), 1, "card without image is skipped");
    assert_eq!(
        root.subtopics.keys().collect::<Vec<_>>(),
        vec!["Fashion, Beauty", "Travel, Outdoors"]
    );

    let fashion = &root.subtopics["Fashion, Beauty"];
    assert_eq!(fashion.items.len(), 1);
    assert_eq!(fashion.items[0].alt_text, "Lime green");
    assert!(fashion.subtopics.contains_key("Brat summer95Pins"));
    assert!(fashion.subtopics.contains_key("quiet-luxury"));

    assert_eq!(output.pages_fetched, 5);
    assert_eq!(delay.count(DelayKind::Politeness), 5);
}

#[tokio::test]
async fn test_collect_topics_cleans_and_flattens() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let crawler = http_crawler(&server.uri(), Arc::new(RecordingDelay::new()));
    let collection = collect_topics(&crawler, "/trends/", 2).await.unwrap();

    assert_eq!(
        collection.names,
        vec!["Brat summer", "Fashion", "Travel", "quiet-luxury"]
    );
    assert!(collection.topics["Fashion"].subtopics["Brat summer"]
        .subtopics
        .is_empty());
}

#[tokio::test]
async fn test_max_depth_zero_fetches_root_only() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/trends/",
        links_page(&[("/trends/a/", "A"), ("/trends/b/", "B")]),
        1,
    )
    .await;
    mount_page(&server, "/trends/a/", links_page(&[]), 0).await;
    mount_page(&server, "/trends/b/", links_page(&[]), 0).await;

    let output = http_crawler(&server.uri(), Arc::new(RecordingDelay::new()))
        .crawl("/trends/", 0)
        .await
        .unwrap();

    assert!(output.root.subtopics.is_empty());
    assert_eq!(output.pages_fetched, 1);
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/trends/",
        links_page(&[("/trends/same/", "Same"), ("/trends/same/", "Same")]),
        1,
    )
    .await;
    mount_page(&server, "/trends/same/", links_page(&[]), 1).await;

    let output = http_crawler(&server.uri(), Arc::new(RecordingDelay::new()))
        .crawl("/trends/", 2)
        .await
        .unwrap();

    assert_eq!(output.root.subtopics.len(), 1);
    assert!(output.root.subtopics.contains_key("Same"));
}

#[tokio::test]
async fn test_duplicate_target_keeps_first_label() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/trends/",
        links_page(&[("/trends/same/", "First"), ("/trends/same/", "Second")]),
        1,
    )
    .await;
    mount_page(&server, "/trends/same/", links_page(&[]), 1).await;

    let delay = Arc::new(RecordingDelay::new());
    let output = http_crawler(&server.uri(), delay.clone())
        .crawl("/trends/", 2)
        .await
        .unwrap();

    assert_eq!(
        output.root.subtopics.keys().collect::<Vec<_>>(),
        vec!["First"]
    );
    assert_eq!(output.pages_fetched, 2);
    assert_eq!(delay.count(DelayKind::Politeness), 2);
}

#[tokio::test]
async fn test_invalid_bytes_do_not_abort_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_bytes(
                    b"<html><body><p>caf\xe9</p><a href=\"/trends/decor/\">Decor</a></body></html>"
                        .to_vec(),
                ),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/trends/decor/", links_page(&[]), 1).await;

    let output = http_crawler(&server.uri(), Arc::new(RecordingDelay::new()))
        .crawl("/trends/", 1)
        .await
        .unwrap();

    assert!(output.root.subtopics.contains_key("Decor"));
    assert_eq!(output.pages_fetched, 2);
}

#[tokio::test]
async fn test_server_error_aborts_crawl() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/trends/",
        links_page(&[("/trends/broken/", "Broken"), ("/trends/later/", "Later")]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/trends/broken/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/trends/later/", links_page(&[]), 0).await;

    let result = http_crawler(&server.uri(), Arc::new(RecordingDelay::new()))
        .crawl("/trends/", 2)
        .await;

    match result {
        Err(CrawlError::Fetch { url, source }) => {
            assert!(url.ends_with("/trends/broken/"));
            assert!(matches!(source, FetchError::Status(500)));
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_page_aborts_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends/"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = http_crawler(&server.uri(), Arc::new(RecordingDelay::new()))
        .crawl("/trends/", 2)
        .await;

    assert!(matches!(
        result,
        Err(CrawlError::Fetch {
            source: FetchError::RateLimit,
            ..
        })
    ));
}

/// Trends service where only "Travel" gains interest
#[derive(Default)]
struct RisingTravel {
    queries: Mutex<Vec<String>>,
}

#[async_trait]
impl TrendsService for RisingTravel {
    async fn build_payload(
        &self,
        queries: &[String],
        _timeframe: &str,
        _geo: &str,
    ) -> Result<(), TrendsError> {
        *self.queries.lock().unwrap() = queries.to_vec();
        Ok(())
    }

    async fn interest_over_time(&self) -> Result<InterestTable, TrendsError> {
        let queries = self.queries.lock().unwrap().clone();
        let recent = |q: &String| if q == "Travel" { 30.0 } else { 10.0 };

        let mut table = InterestTable::new(queries.clone());
        table.push_row(
            Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
            vec![10.0; queries.len()],
        )?;
        table.push_row(
            Utc.with_ymd_and_hms(2024, 7, 31, 0, 0, 0).unwrap(),
            queries.iter().map(recent).collect(),
        )?;
        Ok(table)
    }
}

#[tokio::test]
async fn test_run_crawls_then_ranks() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let crawler = http_crawler(&server.uri(), Arc::new(RecordingDelay::new()));
    let delay = Arc::new(RecordingDelay::new());
    let analyzer = BatchAnalyzer::new(
        Arc::new(RisingTravel::default()),
        delay.clone(),
        TrendsConfig::default(),
    );

    let (collection, report) = pipeline::run(&crawler, &analyzer, "/trends/", 2)
        .await
        .unwrap();

    assert_eq!(collection.names.len(), 4);
    assert_eq!(report.len(), 4);
    assert_eq!(report.records()[0].query, "Travel");
    assert!((report.records()[0].growth_pct - 200.0).abs() < 1e-9);
    assert_eq!(delay.count(DelayKind::InterBatch), 0);
}
