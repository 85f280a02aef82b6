//! Crawl state tracking
//!
//! # Components
//!
//! - `CrawlPhase`: the orchestrator's state machine, with validated transitions
//! - `CrawlOutcome` / `StopReason`: how and why a crawl ended
//! - `PageFailure` / `FailedPage`: why an individual page was skipped

mod outcome;
mod phase;

// Re-export main types
pub use outcome::{CrawlOutcome, FailedPage, PageFailure, StopReason};
pub use phase::{CrawlPhase, PhaseTracker};
