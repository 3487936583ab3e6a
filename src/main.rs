use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendscope::config::Config;

mod commands;

use commands::OutputFormat;

#[derive(Parser)]
#[command(
    name = "trendscope",
    version,
    about = "Crawl trend topics and rank them by search-interest growth",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the topic hierarchy and print every topic name
    Crawl(CrawlArgs),

    /// Crawl topics and rank them by search-interest growth (default)
    Analyze(CrawlArgs),

    /// Rank the given topic names without crawling
    Topics {
        /// Topic names to analyze
        #[arg(required = true)]
        names: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Args, Default)]
struct CrawlArgs {
    /// Maximum link depth below the start page
    #[arg(short, long)]
    max_depth: Option<u32>,

    /// Start page, as a path or an absolute URL
    #[arg(short, long)]
    start_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

impl CrawlArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(max_depth) = self.max_depth {
            config.crawler.max_depth = max_depth;
        }
        if let Some(start) = &self.start_url {
            config.crawler.start_path = start.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let log_format = if cli.log_format == "text" {
        config.logging.format.clone()
    } else {
        cli.log_format.clone()
    };
    setup_tracing(&log_format, cli.verbose, &config.logging.level)?;

    tracing::info!("trendscope starting");

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Analyze(CrawlArgs::default()));

    match command {
        Commands::Crawl(args) => {
            args.apply(&mut config);
            config.validate().context("Invalid configuration")?;
            tracing::info!(
                start = %config.crawler.start_path,
                max_depth = config.crawler.max_depth,
                "Starting crawl command"
            );
            commands::crawl(config, args.output).await?;
        }

        Commands::Analyze(args) => {
            args.apply(&mut config);
            config.validate().context("Invalid configuration")?;
            tracing::info!(
                start = %config.crawler.start_path,
                max_depth = config.crawler.max_depth,
                batch_size = config.trends.batch_size,
                "Starting analyze command"
            );
            commands::analyze(config, args.output).await?;
        }

        Commands::Topics { names, output } => {
            config.validate().context("Invalid configuration")?;
            tracing::info!(names = names.len(), "Starting topics command");
            commands::topics(config, names, output).await?;
        }
    }

    tracing::info!("trendscope finished");
    Ok(())
}

fn setup_tracing(format: &str, verbose: bool, level: &str) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("trendscope=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(format!("trendscope={level},warn")))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
