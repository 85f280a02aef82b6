//! List-Harvest main entry point
//!
//! This is the command-line interface for the List-Harvest listing extractor.

use anyhow::Context;
use clap::Parser;
use list_harvest::config::{load_config_with_hash, Config, PaginationMode};
use list_harvest::crawler::{Coordinator, HttpFetcher};
use list_harvest::extract::ExtractionProfile;
use list_harvest::output::{self, AssetSink, CrawlSummary};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// List-Harvest: resilient listing-page record extraction
///
/// List-Harvest walks the pages of an HTML listing described by a TOML
/// profile, extracts one record per item block, and writes the result set
/// as JSON and CSV.
#[derive(Parser, Debug)]
#[command(name = "list-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Resilient listing-page record extraction", long_about = None)]
struct Cli {
    /// Path to TOML listing profile
    #[arg(value_name = "PROFILE")]
    profile: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// First page index to fetch
    #[arg(long, value_name = "N")]
    start_page: Option<u32>,

    /// Maximum number of pages to attempt
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Stop once this many records were gathered
    #[arg(long, value_name = "N")]
    target: Option<usize>,

    /// Number of page fetches in flight
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Validate and compile the profile, show the crawl plan and exit
    #[arg(long)]
    dry_run: bool,

    /// Skip asset downloads even if the profile configures them
    #[arg(long)]
    no_assets: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading profile from: {}", cli.profile.display());
    let (mut config, hash) = load_config_with_hash(&cli.profile)
        .with_context(|| format!("failed to load profile {}", cli.profile.display()))?;
    tracing::info!("Profile loaded successfully (hash: {})", hash);

    apply_overrides(&mut config, &cli)?;

    let profile = ExtractionProfile::compile(&config).context("failed to compile profile")?;

    if cli.dry_run {
        handle_dry_run(&config, &profile);
        return Ok(());
    }

    handle_crawl(config, profile, cli.no_assets).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("list_harvest=info,warn"),
            1 => EnvFilter::new("list_harvest=debug,info"),
            2 => EnvFilter::new("list_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides to the crawl section
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(start) = cli.start_page {
        anyhow::ensure!(start >= 1, "--start-page must be at least 1");
        config.crawl.start_page = start;
    }
    if let Some(max) = cli.max_pages {
        anyhow::ensure!(max >= 1, "--max-pages must be at least 1");
        config.crawl.max_pages = Some(max);
    }
    if let Some(target) = cli.target {
        anyhow::ensure!(target >= 1, "--target must be at least 1");
        config.crawl.target_records = Some(target);
    }
    if let Some(concurrency) = cli.concurrency {
        anyhow::ensure!(
            (1..=32).contains(&concurrency),
            "--concurrency must be between 1 and 32"
        );
        config.crawl.concurrency = concurrency;
    }
    Ok(())
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, profile: &ExtractionProfile) {
    println!("=== List-Harvest Dry Run ===\n");

    println!("Source:");
    println!("  Template: {}", config.source.url_template);
    println!("  Index pattern: {}", profile.template().index_pattern());
    let first = config.crawl.start_page;
    for page in first..first.saturating_add(3) {
        println!("  Page {}: {}", page, profile.page_url(page));
    }

    println!("\nCrawl:");
    println!("  Start page: {}", config.crawl.start_page);
    match config.crawl.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }
    match config.crawl.target_records {
        Some(target) => println!("  Target records: {}", target),
        None => println!("  Target records: none"),
    }
    println!("  Page delay: {}ms", config.crawl.page_delay);
    println!("  Item delay: {}ms", config.crawl.item_delay);
    println!("  Concurrency: {}", config.crawl.concurrency);
    println!(
        "  Failure threshold: {} consecutive pages",
        config.crawl.max_consecutive_failures
    );
    println!(
        "  Pagination: {}",
        match profile.pagination_mode() {
            PaginationMode::Detect => "detect on first page",
            PaginationMode::Budget => "fixed page budget",
        }
    );

    println!("\nBlock strategies:");
    for (i, strategy) in profile.locator().strategies().iter().enumerate() {
        println!("  {}. {}", i + 1, strategy.label());
    }

    println!("\nFields ({}):", profile.fields().fields().len());
    for field in profile.fields().fields() {
        println!(
            "  - {} ({:?}{})",
            field.name(),
            field.kind(),
            if field.is_mandatory() { ", mandatory" } else { "" }
        );
    }

    println!("\nOutput:");
    if let Some(path) = &config.output.json_path {
        println!("  JSON: {}", path);
    }
    if let Some(path) = &config.output.csv_path {
        println!("  CSV: {}", path);
    }
    if let Some(assets) = &config.assets {
        println!("  Assets: {} -> {}/", assets.url_field, assets.directory);
    }

    println!("\n✓ Profile is valid");
}

/// Handles the normal crawl mode
async fn handle_crawl(
    config: Config,
    profile: ExtractionProfile,
    no_assets: bool,
) -> anyhow::Result<()> {
    let fetcher =
        HttpFetcher::from_config(&config.user_agent).context("failed to build HTTP client")?;
    let client = fetcher.client().clone();
    let columns = profile.columns();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            interrupt.cancel();
        }
    });

    let report = Coordinator::new(profile, config.crawl.clone(), fetcher)
        .with_cancellation(cancel)
        .run()
        .await?;

    // Partial results are written too
    let sinks = output::sinks_from_config(&config.output, chrono::Local::now());
    output::persist(&sinks, &columns, &report.records).context("failed to write records")?;

    if let (Some(assets), false) = (&config.assets, no_assets) {
        let sink = AssetSink::new(
            client,
            &assets.directory,
            &assets.url_field,
            &assets.name_field,
        );
        let downloaded = sink.save_all(&report.records).await;
        tracing::info!(
            "Downloaded {} assets into {}",
            downloaded,
            sink.directory().display()
        );
    }

    output::print_summary(&CrawlSummary::from_report(&report, &columns));

    if report.outcome == list_harvest::CrawlOutcome::Aborted {
        anyhow::bail!("crawl aborted: {}", report.stop_reason);
    }
    Ok(())
}
