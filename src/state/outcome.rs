use crate::crawler::FetchError;
use std::fmt;

/// Terminal result of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    Done,
    Aborted,
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => write!(f, "done"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Why the crawl stopped requesting pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The target record count was reached
    TargetReached,
    /// A page yielded no item blocks
    EmptyPage,
    /// Pagination says there is no further page
    LastPage,
    /// The maximum number of pages was attempted
    PageBudget,
    /// Cancelled from outside
    Cancelled,
    /// Too many consecutive page failures
    TooManyFailures,
    /// No page was ever fetched successfully
    NothingSucceeded,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TargetReached => "target reached",
            Self::EmptyPage => "empty page",
            Self::LastPage => "last page",
            Self::PageBudget => "page budget exhausted",
            Self::Cancelled => "cancelled",
            Self::TooManyFailures => "too many consecutive failures",
            Self::NothingSucceeded => "no page succeeded",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a page was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFailure {
    /// The page could not be retrieved
    Fetch(FetchError),
    /// The body is empty, not HTML, or its URL is unusable
    Parse(String),
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "fetch failed: {}", e),
            Self::Parse(reason) => write!(f, "unparseable: {}", reason),
        }
    }
}

/// A skipped page, kept in the crawl report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    pub page: u32,
    pub url: String,
    pub reason: PageFailure,
}
