//! Crawl summary statistics
//!
//! This module condenses a crawl report into the numbers worth printing at
//! the end of a run: page tallies, record totals, sums of counter fields and
//! a short preview.

use crate::crawler::CrawlReport;
use crate::extract::{FieldValue, Record};
use crate::state::{CrawlOutcome, StopReason};

/// Records shown in the preview
pub const PREVIEW_LEN: usize = 5;

/// Crawl summary
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub outcome: CrawlOutcome,
    pub stop_reason: StopReason,
    pub total_records: usize,
    pub pages_attempted: u32,
    pub pages_succeeded: u32,
    pub pages_failed: u32,
    pub blocks_rejected: usize,
    /// Known page count from pagination, if any
    pub total_pages: Option<u32>,
    /// Sum of every integer field, in column order
    pub integer_totals: Vec<(String, i64)>,
    /// First records, in crawl order
    pub preview: Vec<Record>,
}

impl CrawlSummary {
    /// Builds a summary from a crawl report
    ///
    /// # Arguments
    ///
    /// * `report` - The finished crawl
    /// * `columns` - Output column order, used to order the totals
    pub fn from_report(report: &CrawlReport, columns: &[String]) -> Self {
        let integer_totals = columns
            .iter()
            .filter_map(|column| {
                let values: Vec<i64> = report
                    .records
                    .iter()
                    .filter_map(|r| r.get(column).and_then(FieldValue::as_integer))
                    .collect();
                (!values.is_empty()).then(|| (column.clone(), values.iter().sum()))
            })
            .collect();

        Self {
            outcome: report.outcome,
            stop_reason: report.stop_reason,
            total_records: report.records.len(),
            pages_attempted: report.pages_attempted,
            pages_succeeded: report.pages_succeeded,
            pages_failed: report.pages_failed,
            blocks_rejected: report.blocks_rejected,
            total_pages: report.pagination.and_then(|p| p.total_pages()),
            integer_totals,
            preview: report.records.iter().take(PREVIEW_LEN).cloned().collect(),
        }
    }

    /// Success rate over attempted pages, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_attempted == 0 {
            return 0.0;
        }
        (self.pages_succeeded as f64 / self.pages_attempted as f64) * 100.0
    }
}

/// Formats a summary for the terminal
pub fn format_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Summary ===\n\n");
    out.push_str(&format!(
        "Outcome: {} ({})\n",
        summary.outcome, summary.stop_reason
    ));
    out.push_str(&format!("Records: {}\n", summary.total_records));
    out.push_str(&format!(
        "Pages: {} attempted, {} succeeded, {} failed ({:.1}% success)\n",
        summary.pages_attempted,
        summary.pages_succeeded,
        summary.pages_failed,
        summary.success_rate()
    ));
    if let Some(total) = summary.total_pages {
        out.push_str(&format!("Listing pages detected: {}\n", total));
    }
    if summary.blocks_rejected > 0 {
        out.push_str(&format!(
            "Blocks rejected (missing mandatory field): {}\n",
            summary.blocks_rejected
        ));
    }

    if !summary.integer_totals.is_empty() {
        out.push_str("\nTotals:\n");
        for (name, total) in &summary.integer_totals {
            out.push_str(&format!("  {}: {}\n", name, total));
        }
    }

    if !summary.preview.is_empty() {
        out.push_str(&format!("\nFirst {} records:\n", summary.preview.len()));
        for (i, record) in summary.preview.iter().enumerate() {
            let line = record
                .fields()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join(" | ");
            out.push_str(&format!("  {}. {}\n", i + 1, line));
        }
    }

    out
}

/// Prints a summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    print!("{}", format_summary(summary));
}
