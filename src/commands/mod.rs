pub mod analyze;
pub mod crawl;

// Re-export command functions for convenience
pub use analyze::{analyze, topics};
pub use crawl::crawl;

use clap::ValueEnum;

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lists and tables
    #[default]
    Text,
    /// A single JSON document on stdout
    Json,
}

fn print_names(names: &[String]) {
    println!("Found {} topics", names.len());
    println!("================");
    for name in names {
        println!("  {name}");
    }
}
