mod analyze;
mod scrape;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::scrape::ScrapeArgs;

#[derive(Debug, Parser)]
#[command(name = "mapharvest")]
#[command(about = "Collect places and reviews from map search results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every keyword in a file and export places and reviews
    Scrape(ScrapeArgs),
    /// Summarize one review file into positive and negative topics
    Analyze {
        /// Path to a `<keyword>_reviews.csv` file
        file: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = mapharvest_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape(args) => scrape::run_scrape(&config, args).await,
        Commands::Analyze { file } => analyze::run_analyze(&file),
    }
}

#[cfg(test)]
mod tests;
