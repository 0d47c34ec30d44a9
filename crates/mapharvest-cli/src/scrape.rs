//! `scrape` command: keyword file in, place and review files out.
//!
//! Per-keyword failures never abort the run. They show up as ERROR status
//! lines and the keyword is simply missing from `00_output.csv`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use mapharvest_core::{AppConfig, Place};
use mapharvest_scraper::{
    write_places_csv, ChromiumLauncher, Dispatcher, KeywordStatus, PhotoDownloader,
    ScrapeContext, ScraperSettings,
};

use crate::analyze::analyze_best_effort;

#[derive(Debug, Args)]
pub(crate) struct ScrapeArgs {
    /// Interface language of the map site (ES or EN)
    #[arg(long, short, default_value = "EN")]
    pub(crate) language: String,

    /// Text file with one search keyword per line
    #[arg(long, short)]
    pub(crate) keywords: PathBuf,

    /// Directory for the CSV files, photos and diagnostics
    #[arg(long, short, default_value = "output")]
    pub(crate) output: PathBuf,

    /// Number of parallel browser sessions (overrides `MAPHARVEST_SHARD_COUNT`)
    #[arg(long)]
    pub(crate) shards: Option<usize>,

    /// Reviews kept per place (overrides `MAPHARVEST_MAX_REVIEWS`)
    #[arg(long)]
    pub(crate) max_reviews: Option<usize>,

    /// Summarize every review file once scraping finishes
    #[arg(long)]
    pub(crate) analyze: bool,
}

/// Read keywords, one per line. Surrounding whitespace is trimmed and blank
/// lines are skipped.
pub(crate) fn read_keywords(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read keyword file {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Review files produced in this run, in place order.
pub(crate) fn review_files(places: &[Place]) -> Vec<&Path> {
    places
        .iter()
        .filter_map(|p| p.review_source_path.as_deref())
        .collect()
}

/// Run a full scrape.
///
/// # Errors
///
/// Returns an error if the keyword file is unreadable or empty, the shard
/// count is zero, the language is unsupported, or the aggregate CSV cannot
/// be written.
pub(crate) async fn run_scrape(config: &AppConfig, args: ScrapeArgs) -> anyhow::Result<()> {
    let keywords = read_keywords(&args.keywords)?;
    if keywords.is_empty() {
        anyhow::bail!("keyword file {} has no keywords", args.keywords.display());
    }
    let shard_count = args.shards.unwrap_or(config.shard_count);
    if shard_count == 0 {
        anyhow::bail!("--shards must be at least 1");
    }

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let mut settings = ScraperSettings::from(config);
    if let Some(max_reviews) = args.max_reviews {
        settings.max_reviews = max_reviews;
    }

    let photos = PhotoDownloader::new(
        Duration::from_secs(config.download_timeout_secs),
        config.download_max_retries,
    )
    .map_err(|e| anyhow::anyhow!("failed to build photo downloader: {e}"))?;
    let launcher = Arc::new(ChromiumLauncher::new(
        config.chromium_path.clone(),
        config.headless,
    ));

    let dispatcher = Dispatcher::new(
        &args.language,
        launcher,
        Arc::new(settings),
        ScrapeContext::new(args.output.clone(), Some(photos)),
    )?
    .with_status_callback(Arc::new(|status: &KeywordStatus| println!("{status}")));

    let places = dispatcher.dispatch(&keywords, shard_count).await;
    let output_csv = write_places_csv(&args.output, &places)
        .with_context(|| format!("failed to write places to {}", args.output.display()))?;

    println!(
        "scraped {} of {} keywords -> {}",
        places.len(),
        keywords.len(),
        output_csv.display()
    );

    if args.analyze {
        let files = review_files(&places);
        if files.is_empty() {
            println!("no review files to analyze");
        }
        for file in files {
            analyze_best_effort(file);
        }
    }

    Ok(())
}
