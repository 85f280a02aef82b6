//! Crawler module for listing page fetching and processing
//!
//! This module contains the crawl loop and its I/O collaborators:
//! - HTTP fetching behind the `PageFetcher` trait
//! - Global fetch pacing
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod scheduler;

pub use coordinator::{Coordinator, CrawlReport, ResultBuffer};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use scheduler::FetchScheduler;

use crate::config::Config;
use crate::extract::ExtractionProfile;
use crate::HarvestError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for a crawl. It will:
/// 1. Compile the profile's selectors, patterns and URL template
/// 2. Build the HTTP client
/// 3. Fetch and extract pages until a stop condition holds
///
/// # Arguments
///
/// * `config` - The listing profile
/// * `cancel` - Token that stops the crawl between pages
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Records and statistics, possibly partial
/// * `Err(HarvestError)` - The profile or client could not be set up
pub async fn harvest(
    config: &Config,
    cancel: CancellationToken,
) -> Result<CrawlReport, HarvestError> {
    let profile = ExtractionProfile::compile(config)?;
    let fetcher = HttpFetcher::from_config(&config.user_agent)?;

    Coordinator::new(profile, config.crawl.clone(), fetcher)
        .with_cancellation(cancel)
        .run()
        .await
}
