use anyhow::{Context, Result};
use serde_json::json;

use trendscope::analytics::BatchAnalyzer;
use trendscope::config::Config;
use trendscope::crawler::TopicCrawler;
use trendscope::error::Error;
use trendscope::models::TrendReport;
use trendscope::pipeline;

use super::{print_names, OutputFormat};

/// Crawl topics, then rank them by search-interest growth
///
/// Failures are reported on stderr without a partial report.
pub async fn analyze(config: Config, output: OutputFormat) -> Result<()> {
    let crawler = TopicCrawler::from_config(&config).context("Failed to set up crawler")?;
    let analyzer =
        BatchAnalyzer::from_config(&config.trends).context("Failed to set up trends client")?;

    let result = pipeline::run(
        &crawler,
        &analyzer,
        &config.crawler.start_path,
        config.crawler.max_depth,
    )
    .await;

    let (collection, report) = match result {
        Ok(done) => done,
        Err(Error::Crawl(e)) => {
            tracing::error!(error = %e, "Crawl failed");
            eprintln!("Crawl failed: {e}");
            return Ok(());
        }
        Err(e) => {
            eprintln!("Trend analysis aborted: {e}");
            return Ok(());
        }
    };

    match output {
        OutputFormat::Text => {
            print_names(&collection.names);
            println!();
            print_report(&report);
        }
        OutputFormat::Json => {
            let doc = json!({
                "names": collection.names,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }

    Ok(())
}

/// Rank an explicit list of topic names, skipping the crawl
pub async fn topics(config: Config, names: Vec<String>, output: OutputFormat) -> Result<()> {
    let analyzer =
        BatchAnalyzer::from_config(&config.trends).context("Failed to set up trends client")?;

    let report = match analyzer.analyze(&names).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Trend analysis aborted: {e}");
            return Ok(());
        }
    };

    match output {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn print_report(report: &TrendReport) {
    if report.is_empty() {
        println!("No topics to analyze");
        return;
    }

    println!("Topics by search-interest growth");
    println!("================================");
    print!("{report}");
}
