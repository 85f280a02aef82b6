use crate::extract::Record;
use crate::output::ensure_parent;
use crate::output::traits::{OutputResult, RecordSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes records as a pretty-printed JSON array
///
/// Non-ASCII text is written as UTF-8, not escaped.
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonSink {
    fn write_records(&self, _columns: &[String], records: &[Record]) -> OutputResult<()> {
        ensure_parent(&self.path)?;
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("JSON {}", self.path.display())
    }
}
