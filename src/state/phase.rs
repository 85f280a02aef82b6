/// Crawl phase definitions
///
/// One page at a time moves through `Fetching`, `Extracting` and `Deciding`;
/// the crawl returns to `Idle` between pages and ends in `Done` or `Aborted`.
use crate::{HarvestError, Result};
use std::fmt;

/// Phase of the crawl loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Between pages
    Idle,

    /// Waiting for a page body
    Fetching,

    /// Locating blocks and extracting records
    Extracting,

    /// Deciding whether to continue
    Deciding,

    // ===== Terminal Phases =====
    /// Finished normally, possibly with partial results
    Done,

    /// Gave up after repeated failures
    Aborted,
}

impl CrawlPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true if `next` is a legal successor of this phase
    ///
    /// A failed fetch skips extraction and goes straight to `Deciding`.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Idle, Done)
                | (Idle, Aborted)
                | (Fetching, Extracting)
                | (Fetching, Deciding)
                | (Extracting, Deciding)
                | (Deciding, Idle)
                | (Deciding, Done)
                | (Deciding, Aborted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Deciding => "deciding",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Holds the current phase and rejects illegal transitions
#[derive(Debug)]
pub struct PhaseTracker {
    phase: CrawlPhase,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Idle,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Moves to `next`, or fails with `InvalidTransition`
    pub fn advance(&mut self, next: CrawlPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
