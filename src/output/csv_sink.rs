use crate::extract::Record;
use crate::output::ensure_parent;
use crate::output::traits::{OutputResult, RecordSink};
use std::path::{Path, PathBuf};

/// Writes records as CSV with a header row
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn write_records(&self, columns: &[String], records: &[Record]) -> OutputResult<()> {
        ensure_parent(&self.path)?;
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(columns)?;
        for record in records {
            writer.write_record(record.row(columns))?;
        }
        writer.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("CSV {}", self.path.display())
    }
}
