//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the page loop that coordinates all aspects of a
//! listing crawl:
//! - Probing for the first page that can be fetched and parsed
//! - Resolving pagination on that page (detect mode)
//! - Streaming the remaining pages through an ordered, bounded window
//! - Accumulating records in page order, then document order
//! - Deciding when to stop and how the crawl ended

use crate::config::{CrawlConfig, PaginationMode};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::scheduler::FetchScheduler;
use crate::extract::{ExtractionProfile, PageExtraction, PaginationState, Record};
use crate::state::{CrawlOutcome, CrawlPhase, FailedPage, PageFailure, PhaseTracker, StopReason};
use crate::Result;
use futures::stream::{self, StreamExt};
use std::pin::pin;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub outcome: CrawlOutcome,
    pub stop_reason: StopReason,
    pub pages_attempted: u32,
    pub pages_succeeded: u32,
    pub pages_failed: u32,
    /// Skipped pages, in page order
    pub failures: Vec<FailedPage>,
    /// Accepted records, in page order then document order
    pub records: Vec<Record>,
    /// Blocks dropped for a missing mandatory field
    pub blocks_rejected: usize,
    /// Pagination as resolved on the first successful page
    pub pagination: Option<PaginationState>,
    pub elapsed: Duration,
}

/// Orchestrator-owned record accumulator
#[derive(Debug, Default)]
pub struct ResultBuffer {
    records: Vec<Record>,
    target: Option<usize>,
}

impl ResultBuffer {
    pub fn new(target: Option<usize>) -> Self {
        Self {
            records: Vec::new(),
            target,
        }
    }

    /// True once the target record count is reached
    pub fn is_full(&self) -> bool {
        self.target.is_some_and(|target| self.records.len() >= target)
    }

    /// Appends a record unless the buffer is already full
    pub fn push(&mut self, record: Record) -> bool {
        if self.is_full() {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// One page's fetch and extraction result
#[derive(Debug)]
struct PageAttempt {
    page: u32,
    url: String,
    result: std::result::Result<PageExtraction, PageFailure>,
}

/// Running tallies of a crawl
struct CrawlProgress {
    tracker: PhaseTracker,
    buffer: ResultBuffer,
    pages_attempted: u32,
    pages_succeeded: u32,
    consecutive_failures: u32,
    failures: Vec<FailedPage>,
    blocks_rejected: usize,
    pagination: Option<PaginationState>,
}

impl CrawlProgress {
    fn new(target: Option<usize>) -> Self {
        Self {
            tracker: PhaseTracker::new(),
            buffer: ResultBuffer::new(target),
            pages_attempted: 0,
            pages_succeeded: 0,
            consecutive_failures: 0,
            failures: Vec::new(),
            blocks_rejected: 0,
            pagination: None,
        }
    }
}

/// Main crawl coordinator
///
/// Generic over the page source so the loop can be driven by HTTP or by an
/// in-memory fetcher.
pub struct Coordinator<F> {
    profile: ExtractionProfile,
    crawl: CrawlConfig,
    fetcher: F,
    scheduler: FetchScheduler,
    cancel: CancellationToken,
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `profile` - The compiled listing profile
    /// * `crawl` - Crawl limits and pacing
    /// * `fetcher` - Source of page bodies
    pub fn new(profile: ExtractionProfile, crawl: CrawlConfig, fetcher: F) -> Self {
        let scheduler = FetchScheduler::from_millis(crawl.page_delay);
        Self {
            profile,
            crawl,
            fetcher,
            scheduler,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the crawl between pages when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn profile(&self) -> &ExtractionProfile {
        &self.profile
    }

    /// Runs the page loop to completion
    ///
    /// Page-level failures never surface here; the report carries them.
    /// An error is returned only for an internal state machine violation.
    pub async fn run(&self) -> Result<CrawlReport> {
        let started = Instant::now();
        let detect = self.profile.pagination_mode() == PaginationMode::Detect;
        let mut progress = CrawlProgress::new(self.crawl.target_records);
        let start_page = self.crawl.start_page.max(1);

        tracing::info!(
            "Starting crawl at page {} ({} pagination, concurrency {})",
            start_page,
            if detect { "detect" } else { "budget" },
            self.crawl.concurrency
        );

        // Probe pages one by one until one succeeds; pagination is read there
        let mut page = start_page;
        let mut stop = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            progress.tracker.advance(CrawlPhase::Fetching)?;
            let attempt = self.process_page(page, detect).await;
            let succeeded = attempt.result.is_ok();
            if let Some(reason) = self.absorb(&mut progress, attempt).await? {
                break reason;
            }
            progress.tracker.advance(CrawlPhase::Idle)?;
            page = page.saturating_add(1);
            if succeeded {
                break self.stream_pages(&mut progress, page).await?;
            }
        };

        if progress.pages_succeeded == 0
            && matches!(stop, StopReason::PageBudget | StopReason::LastPage)
        {
            stop = StopReason::NothingSucceeded;
        }

        let outcome = if stop == StopReason::TooManyFailures || progress.pages_succeeded == 0 {
            CrawlOutcome::Aborted
        } else {
            CrawlOutcome::Done
        };
        progress.tracker.advance(match outcome {
            CrawlOutcome::Done => CrawlPhase::Done,
            CrawlOutcome::Aborted => CrawlPhase::Aborted,
        })?;

        let records = progress.buffer.into_records();
        let pages_failed = progress.failures.len() as u32;
        tracing::info!(
            "Crawl {} ({}): {} records from {}/{} pages",
            outcome,
            stop,
            records.len(),
            progress.pages_succeeded,
            progress.pages_attempted
        );

        Ok(CrawlReport {
            outcome,
            stop_reason: stop,
            pages_attempted: progress.pages_attempted,
            pages_succeeded: progress.pages_succeeded,
            pages_failed,
            failures: progress.failures,
            records,
            blocks_rejected: progress.blocks_rejected,
            pagination: progress.pagination,
            elapsed: started.elapsed(),
        })
    }

    /// Fetches pages `first..` through an ordered window of `concurrency` fetches
    ///
    /// Returns with the tracker in `Idle` or `Deciding`.
    async fn stream_pages(&self, progress: &mut CrawlProgress, first: u32) -> Result<StopReason> {
        let last = self.upper_bound(progress.pagination).unwrap_or(u32::MAX);
        let mut outcomes = pin!(stream::iter(first..=last)
            .map(|page| self.process_page(page, false))
            .buffered(self.crawl.concurrency.max(1)));

        loop {
            if self.cancel.is_cancelled() {
                return Ok(StopReason::Cancelled);
            }

            progress.tracker.advance(CrawlPhase::Fetching)?;
            let attempt = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    progress.tracker.advance(CrawlPhase::Deciding)?;
                    return Ok(StopReason::Cancelled);
                }
                next = outcomes.next() => next,
            };

            let Some(attempt) = attempt else {
                progress.tracker.advance(CrawlPhase::Deciding)?;
                return Ok(StopReason::PageBudget);
            };

            if let Some(reason) = self.absorb(progress, attempt).await? {
                return Ok(reason);
            }
            progress.tracker.advance(CrawlPhase::Idle)?;
        }
    }

    /// Last page the stream may request, if any limit is known
    fn upper_bound(&self, pagination: Option<PaginationState>) -> Option<u32> {
        let budget = self.budget_end();
        let known = pagination.and_then(|p| p.known_last_page);
        match (budget, known) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Last page allowed by `max-pages`
    fn budget_end(&self) -> Option<u32> {
        self.crawl
            .max_pages
            .map(|max| self.crawl.start_page.max(1).saturating_add(max.saturating_sub(1)))
    }

    /// Fetches and extracts one page
    ///
    /// The parsed document lives only inside the synchronous extraction call.
    async fn process_page(&self, page: u32, resolve_pagination: bool) -> PageAttempt {
        let url = self.profile.page_url(page);

        self.scheduler.acquire().await;
        tracing::debug!("Fetching page {}: {}", page, url);

        let result = match self.fetcher.fetch(&url).await {
            Err(e) => Err(PageFailure::Fetch(e)),
            Ok(fetched) if fetched.body.trim().is_empty() => {
                Err(PageFailure::Parse("empty body".to_string()))
            }
            Ok(fetched) if !fetched.is_html() => Err(PageFailure::Parse(format!(
                "content type {}",
                fetched.content_type.as_deref().unwrap_or("unknown")
            ))),
            Ok(fetched) => match Url::parse(&fetched.url).or_else(|_| Url::parse(&url)) {
                Ok(page_url) => Ok(self.profile.extract_page(
                    &fetched.body,
                    &page_url,
                    page,
                    resolve_pagination,
                )),
                Err(e) => Err(PageFailure::Parse(format!("bad page URL: {}", e))),
            },
        };

        PageAttempt { page, url, result }
    }

    /// Folds one page into the progress and decides whether to continue
    ///
    /// Enters with the tracker in `Fetching`, leaves it in `Deciding`.
    async fn absorb(
        &self,
        progress: &mut CrawlProgress,
        attempt: PageAttempt,
    ) -> Result<Option<StopReason>> {
        progress.pages_attempted += 1;
        let page = attempt.page;

        let extraction = match attempt.result {
            Err(reason) => {
                progress.tracker.advance(CrawlPhase::Deciding)?;
                progress.consecutive_failures += 1;
                tracing::warn!("Page {} skipped ({}): {}", page, attempt.url, reason);
                progress.failures.push(FailedPage {
                    page,
                    url: attempt.url,
                    reason,
                });

                if progress.consecutive_failures >= self.crawl.max_consecutive_failures {
                    tracing::error!(
                        "{} consecutive page failures, aborting",
                        progress.consecutive_failures
                    );
                    return Ok(Some(StopReason::TooManyFailures));
                }
                return Ok(self.limit_reached(progress, page));
            }
            Ok(extraction) => extraction,
        };

        progress.tracker.advance(CrawlPhase::Extracting)?;
        progress.pages_succeeded += 1;
        progress.consecutive_failures = 0;
        progress.blocks_rejected += extraction.blocks_rejected;

        match &extraction.stage {
            Some(stage) => tracing::info!(
                "Page {}: {} records ({} blocks via {}, {} rejected)",
                page,
                extraction.records.len(),
                extraction.blocks_found,
                stage,
                extraction.blocks_rejected
            ),
            None => tracing::info!("Page {}: no item blocks", page),
        }

        let item_delay = Duration::from_millis(self.crawl.item_delay);
        for record in extraction.records {
            if !progress.buffer.push(record) {
                break;
            }
            if !item_delay.is_zero() {
                tokio::time::sleep(item_delay).await;
            }
        }

        if let Some(state) = extraction.pagination {
            match state.total_pages() {
                Some(total) => tracing::info!("Pagination: {} pages ({:?})", total, state.evidence),
                None => tracing::info!("Pagination: total unknown ({:?})", state.evidence),
            }
            progress.pagination = Some(state);
        }

        progress.tracker.advance(CrawlPhase::Deciding)?;

        if extraction.blocks_found == 0 {
            return Ok(Some(StopReason::EmptyPage));
        }
        if progress.buffer.is_full() {
            return Ok(Some(StopReason::TargetReached));
        }
        Ok(self.limit_reached(progress, page))
    }

    /// Pagination end or page budget, as seen after `page`
    fn limit_reached(&self, progress: &CrawlProgress, page: u32) -> Option<StopReason> {
        if let Some(state) = progress.pagination {
            if !state.has_more_after(page) {
                return Some(StopReason::LastPage);
            }
        }
        if self.budget_end().is_some_and(|end| page >= end) {
            return Some(StopReason::PageBudget);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::crawler::fetcher::{FetchError, FetchedPage};
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    const BASE: &str = "http://list.test";

    /// Serves canned pages; unknown URLs answer 404
    #[derive(Default)]
    struct MemoryFetcher {
        pages: HashMap<String, String>,
        delays: HashMap<String, Duration>,
        cancel_on: Option<(String, CancellationToken)>,
        requested: Mutex<Vec<String>>,
    }

    impl MemoryFetcher {
        fn with_page(mut self, page: u32, body: String) -> Self {
            self.pages.insert(page_url(page), body);
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl PageFetcher for MemoryFetcher {
        fn fetch(
            &self,
            url: &str,
        ) -> impl Future<Output = std::result::Result<FetchedPage, FetchError>> + Send {
            self.requested.lock().unwrap().push(url.to_string());
            if let Some((trigger, token)) = &self.cancel_on {
                if trigger == url {
                    token.cancel();
                }
            }

            let result = match self.pages.get(url) {
                Some(body) => Ok(FetchedPage {
                    url: url.to_string(),
                    status: 200,
                    content_type: Some("text/html; charset=utf-8".to_string()),
                    body: body.clone(),
                }),
                None => Err(FetchError::Status(404)),
            };
            let delay = self.delays.get(url).copied().unwrap_or_default();

            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
        }
    }

    fn page_url(page: u32) -> String {
        format!("{}/news/list_{}.htm", BASE, page)
    }

    /// A listing page with `items` entries and optional pagination markup
    fn listing(page: u32, items: usize, pagination: &str) -> String {
        let entries: String = (1..=items)
            .map(|i| format!(r#"<li><a href="/news/{page}_{i}.htm">条目 {page}-{i}</a></li>"#))
            .collect();
        format!(
            r#"<html><body><ul class="news-list">{}</ul>{}</body></html>"#,
            entries, pagination
        )
    }

    fn numbered(last: u32) -> String {
        let links: String = (1..=last)
            .map(|p| format!(r#"<a href="list_{p}.htm">{p}</a>"#))
            .collect();
        format!(r#"<div class="pages">{}</div>"#, links)
    }

    fn coordinator<F: PageFetcher>(crawl: &str, fetcher: F) -> Coordinator<F> {
        build(crawl, "", fetcher)
    }

    /// Builds a coordinator; `sections` is appended after the field tables
    fn build<F: PageFetcher>(crawl: &str, sections: &str, fetcher: F) -> Coordinator<F> {
        let toml = format!(
            r#"
[crawl]
page-delay = 0
{crawl}

[source]
url-template = "{BASE}/news/list_{{page}}.htm"

[[fields]]
name = "title"
mandatory = true
candidates = [{{ selector = "a" }}]

[[fields]]
name = "url"
kind = "url"
candidates = [{{ selector = "a" }}]

{sections}
"#
        );
        let config = parse_config(&toml).unwrap();
        let profile = ExtractionProfile::compile(&config).unwrap();
        Coordinator::new(profile, config.crawl, fetcher)
    }

    fn pages_of(report: &CrawlReport) -> Vec<u32> {
        report.records.iter().map(|r| r.source_page()).collect()
    }

    #[tokio::test]
    async fn test_two_page_listing_ends_done() {
        let fetcher = MemoryFetcher::default()
            .with_page(1, listing(1, 10, &numbered(2)))
            .with_page(2, listing(2, 3, &numbered(2)));
        let report = coordinator("", fetcher).run().await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Done);
        assert_eq!(report.stop_reason, StopReason::LastPage);
        assert_eq!(report.records.len(), 13);
        assert_eq!(pages_of(&report).iter().filter(|p| **p == 1).count(), 10);
        assert_eq!(pages_of(&report).iter().filter(|p| **p == 2).count(), 3);
        assert_eq!(report.pages_attempted, 2);
        assert_eq!(report.pagination.unwrap().known_last_page, Some(2));
        assert_eq!(
            report.records[0].text("url"),
            Some("http://list.test/news/1_1.htm")
        );
    }

    fn four_pages() -> MemoryFetcher {
        (1..=4).fold(MemoryFetcher::default(), |f, p| {
            f.with_page(p, listing(p, 2, &numbered(4)))
        })
    }

    #[tokio::test]
    async fn test_resume_matches_tail_of_full_crawl() {
        let full = coordinator("", four_pages()).run().await.unwrap();
        let resumed = coordinator("start-page = 3", four_pages()).run().await.unwrap();

        let tail: Vec<Record> = full
            .records
            .iter()
            .filter(|r| r.source_page() >= 3)
            .cloned()
            .collect();
        assert_eq!(full.records.len(), 8);
        assert_eq!(resumed.records, tail);
        assert_eq!(resumed.pages_attempted, 2);
    }

    #[tokio::test]
    async fn test_always_failing_fetcher_aborts_after_threshold() {
        let fetcher = MemoryFetcher::default();
        let c = coordinator("max-consecutive-failures = 3", fetcher);
        let report = c.run().await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Aborted);
        assert_eq!(report.stop_reason, StopReason::TooManyFailures);
        assert_eq!(report.pages_attempted, 3);
        assert_eq!(report.pages_failed, 3);
        assert!(report.records.is_empty());
        assert_eq!(
            report.failures[0].reason,
            PageFailure::Fetch(FetchError::Status(404))
        );
    }

    #[tokio::test]
    async fn test_next_only_crawls_until_empty_page() {
        let next = r#"<div class="nav"><a href="javascript:;">下一页</a></div>"#;
        let fetcher = MemoryFetcher::default()
            .with_page(1, listing(1, 2, next))
            .with_page(2, listing(2, 2, next))
            .with_page(3, listing(3, 1, next))
            .with_page(4, "<html><body><p>没有更多内容</p></body></html>".to_string());
        let report = coordinator("", fetcher).run().await.unwrap();

        assert!(report.pagination.unwrap().has_more);
        assert_eq!(report.pagination.unwrap().known_last_page, None);
        assert_eq!(report.stop_reason, StopReason::EmptyPage);
        assert_eq!(report.outcome, CrawlOutcome::Done);
        assert_eq!(report.records.len(), 5);
        assert_eq!(report.pages_attempted, 4);
    }

    #[tokio::test]
    async fn test_single_page_with_next_like_title_ends_done() {
        let body = r#"<html><body><ul class="news-list">
            <li><a href="/news/1.htm">Next.js 实战</a></li>
            <li><a href="/news/2.htm">Rust 入门</a></li>
        </ul></body></html>"#;
        let fetcher = MemoryFetcher::default().with_page(1, body.to_string());
        let c = coordinator("", fetcher);
        let report = c.run().await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Done);
        assert_eq!(report.stop_reason, StopReason::LastPage);
        assert_eq!(report.pages_attempted, 1);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.pagination.unwrap().total_pages(), Some(1));
        assert_eq!(c.fetcher.requested(), vec![page_url(1)]);
    }

    #[tokio::test]
    async fn test_target_truncates_buffer() {
        let fetcher = (1..=3).fold(MemoryFetcher::default(), |f, p| {
            f.with_page(p, listing(p, 4, &numbered(3)))
        });
        let report = coordinator("target-records = 5", fetcher).run().await.unwrap();

        assert_eq!(report.records.len(), 5);
        assert_eq!(report.stop_reason, StopReason::TargetReached);
        assert_eq!(report.pages_attempted, 2);
        assert_eq!(pages_of(&report), vec![1, 1, 1, 1, 2]);
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped() {
        let fetcher = MemoryFetcher::default()
            .with_page(1, listing(1, 2, &numbered(3)))
            .with_page(3, listing(3, 2, &numbered(3)));
        let report = coordinator("", fetcher).run().await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Done);
        assert_eq!(pages_of(&report), vec![1, 1, 3, 3]);
        assert_eq!(report.pages_failed, 1);
        assert_eq!(report.failures[0].page, 2);
    }

    #[tokio::test]
    async fn test_first_page_failure_probes_next_page() {
        let fetcher = MemoryFetcher::default().with_page(2, listing(2, 3, &numbered(2)));
        let report = coordinator("", fetcher).run().await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Done);
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.pages_attempted, 2);
        assert_eq!(report.pagination.unwrap().known_last_page, Some(2));
    }

    #[tokio::test]
    async fn test_budget_mode_ignores_pagination() {
        let fetcher = (1..=6).fold(MemoryFetcher::default(), |f, p| {
            f.with_page(p, listing(p, 1, &numbered(2)))
        });
        let c = build("max-pages = 4", "[pagination]\nmode = \"budget\"", fetcher);
        let report = c.run().await.unwrap();

        assert!(report.pagination.is_none());
        assert_eq!(report.stop_reason, StopReason::PageBudget);
        assert_eq!(report.pages_attempted, 4);
        assert_eq!(c.fetcher.requested().len(), 4);
    }

    #[tokio::test]
    async fn test_cancellation_returns_partial_records() {
        let token = CancellationToken::new();
        let mut fetcher = (1..=5).fold(MemoryFetcher::default(), |f, p| {
            f.with_page(p, listing(p, 2, &numbered(5)))
        });
        fetcher.cancel_on = Some((page_url(2), token.clone()));

        let report = coordinator("", fetcher)
            .with_cancellation(token)
            .run()
            .await
            .unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Done);
        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert!(report.pages_attempted <= 2);
        assert!(pages_of(&report).iter().all(|p| *p <= 2));
        assert!(!report.records.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_is_aborted() {
        let c = coordinator("", four_pages());
        c.cancellation_token().cancel();
        let report = c.run().await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Aborted);
        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.pages_attempted, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_keep_page_order() {
        let mut fetcher = (1..=6).fold(MemoryFetcher::default(), |f, p| {
            f.with_page(p, listing(p, 2, &numbered(6)))
        });
        // Earlier pages answer last
        for page in 2..=6 {
            fetcher
                .delays
                .insert(page_url(page), Duration::from_millis(600 - 100 * page as u64));
        }

        let report = coordinator("concurrency = 4", fetcher).run().await.unwrap();

        assert_eq!(report.records.len(), 12);
        let pages = pages_of(&report);
        let mut sorted = pages.clone();
        sorted.sort();
        assert_eq!(pages, sorted);
        assert_eq!(
            report.records[2].text("title"),
            Some("条目 2-1")
        );
    }

    #[tokio::test]
    async fn test_non_html_page_is_a_parse_failure() {
        struct JsonFetcher;
        impl PageFetcher for JsonFetcher {
            fn fetch(
                &self,
                url: &str,
            ) -> impl Future<Output = std::result::Result<FetchedPage, FetchError>> + Send
            {
                let page = FetchedPage {
                    url: url.to_string(),
                    status: 200,
                    content_type: Some("application/json".to_string()),
                    body: "{}".to_string(),
                };
                async move { Ok(page) }
            }
        }

        let report = coordinator("max-consecutive-failures = 2", JsonFetcher)
            .run()
            .await
            .unwrap();
        assert_eq!(report.outcome, CrawlOutcome::Aborted);
        assert!(matches!(report.failures[0].reason, PageFailure::Parse(_)));
    }

    #[test]
    fn test_result_buffer_target() {
        let mut buffer = ResultBuffer::new(Some(1));
        assert!(buffer.is_empty());
        assert!(buffer.push(Record::new(vec![], 1)));
        assert!(buffer.is_full());
        assert!(!buffer.push(Record::new(vec![], 1)));
        assert_eq!(buffer.len(), 1);
    }
}
