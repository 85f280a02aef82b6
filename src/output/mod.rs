//! Output module for persisting crawl results
//!
//! This module handles:
//! - Writing the record set as JSON and CSV
//! - Downloading media assets referenced by records
//! - Summarizing a crawl for the terminal

mod assets;
mod csv_sink;
mod json_sink;
pub mod stats;
mod traits;

pub use assets::{extension_of, safe_file_name, AssetOutcome, AssetSink};
pub use csv_sink::CsvSink;
pub use json_sink::JsonSink;
pub use stats::{format_summary, print_summary, CrawlSummary};
pub use traits::{OutputError, OutputResult, RecordSink};

use crate::config::OutputConfig;
use crate::extract::Record;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Inserts `_YYYYmmdd_HHMMSS` between a file stem and its extension
///
/// # Example
///
/// ```
/// use chrono::{Local, TimeZone};
/// use list_harvest::output::timestamped_path;
///
/// let at = Local.with_ymd_and_hms(2024, 3, 18, 9, 5, 0).unwrap();
/// let path = timestamped_path("out/blogs.json", at);
/// assert_eq!(path.to_str().unwrap(), "out/blogs_20240318_090500.json");
/// ```
pub fn timestamped_path(path: impl AsRef<Path>, at: DateTime<Local>) -> PathBuf {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = at.format("%Y%m%d_%H%M%S");
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}_{}", stem, stamp),
    };
    path.with_file_name(name)
}

/// Builds the sinks named by the `[output]` section
pub fn sinks_from_config(config: &OutputConfig, at: DateTime<Local>) -> Vec<Box<dyn RecordSink>> {
    let resolve = |path: &str| {
        if config.timestamped {
            timestamped_path(path, at)
        } else {
            PathBuf::from(path)
        }
    };

    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();
    if let Some(path) = &config.json_path {
        sinks.push(Box::new(JsonSink::new(resolve(path))));
    }
    if let Some(path) = &config.csv_path {
        sinks.push(Box::new(CsvSink::new(resolve(path))));
    }
    sinks
}

/// Writes records to every sink
///
/// Stops at the first failing sink.
pub fn persist(
    sinks: &[Box<dyn RecordSink>],
    columns: &[String],
    records: &[Record],
) -> OutputResult<()> {
    for sink in sinks {
        sink.write_records(columns, records)?;
        tracing::info!("Wrote {} records to {}", records.len(), sink.describe());
    }
    Ok(())
}

/// Creates the parent directory of an output path
pub fn ensure_parent(path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
