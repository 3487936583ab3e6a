use anyhow::{Context, Result};
use serde_json::json;

use trendscope::config::Config;
use trendscope::crawler::TopicCrawler;
use trendscope::pipeline::collect_topics;

use super::{print_names, OutputFormat};

/// Crawl the topic hierarchy and print every topic name
///
/// A failed crawl is reported on stderr; nothing else is printed.
pub async fn crawl(config: Config, output: OutputFormat) -> Result<()> {
    let crawler = TopicCrawler::from_config(&config).context("Failed to set up crawler")?;

    let collection = match collect_topics(
        &crawler,
        &config.crawler.start_path,
        config.crawler.max_depth,
    )
    .await
    {
        Ok(collection) => collection,
        Err(e) => {
            tracing::error!(error = %e, "Crawl failed");
            eprintln!("Crawl failed: {e}");
            return Ok(());
        }
    };

    match output {
        OutputFormat::Text => {
            println!("Crawled {} pages", collection.pages_fetched);
            print_names(&collection.names);
        }
        OutputFormat::Json => {
            let doc = json!({
                "pages_fetched": collection.pages_fetched,
                "topics": collection.topics,
                "names": collection.names,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }

    Ok(())
}
