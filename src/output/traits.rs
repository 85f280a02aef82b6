//! Output sink traits and errors

use crate::extract::Record;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Asset download failed for {url}: {message}")]
    Download { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for an accumulated record set
pub trait RecordSink {
    /// Writes all records; `columns` is the declared field order plus `source_page`
    ///
    /// # Arguments
    ///
    /// * `columns` - Column names in output order
    /// * `records` - Records in crawl order
    fn write_records(&self, columns: &[String], records: &[Record]) -> OutputResult<()>;

    /// Human-readable destination, for logs
    fn describe(&self) -> String;
}
