//! Binary asset download
//!
//! Saves a record's media URL (a poster, a cover) under a file name derived
//! from another field. Each file name is fetched at most once.

use crate::extract::Record;
use crate::output::traits::{OutputError, OutputResult};
use reqwest::Client;
use std::path::{Path, PathBuf};

const DEFAULT_EXTENSION: &str = ".jpg";

/// Result of one asset request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    Downloaded(PathBuf),
    /// The file was already present
    Skipped(PathBuf),
    /// The record has no media URL or no name
    Missing,
}

/// Downloads media URLs into a directory
#[derive(Debug, Clone)]
pub struct AssetSink {
    client: Client,
    directory: PathBuf,
    url_field: String,
    name_field: String,
}

impl AssetSink {
    pub fn new(
        client: Client,
        directory: impl AsRef<Path>,
        url_field: &str,
        name_field: &str,
    ) -> Self {
        Self {
            client,
            directory: directory.as_ref().to_path_buf(),
            url_field: url_field.to_string(),
            name_field: name_field.to_string(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Downloads the asset of one record unless its file already exists
    pub async fn save(&self, record: &Record) -> OutputResult<AssetOutcome> {
        let (Some(url), Some(name)) = (
            record.text(&self.url_field).filter(|u| !u.is_empty()),
            record.text(&self.name_field).filter(|n| !n.is_empty()),
        ) else {
            return Ok(AssetOutcome::Missing);
        };

        let path = self
            .directory
            .join(format!("{}{}", safe_file_name(name), extension_of(url)));

        if tokio::fs::try_exists(&path).await? {
            tracing::debug!("Asset exists, skipping: {}", path.display());
            return Ok(AssetOutcome::Skipped(path));
        }

        let download_error = |e: reqwest::Error| OutputError::Download {
            url: url.to_string(),
            message: e.to_string(),
        };
        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(download_error)?
            .bytes()
            .await
            .map_err(download_error)?;

        tokio::fs::create_dir_all(&self.directory).await?;
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!("Saved asset {}", path.display());

        Ok(AssetOutcome::Downloaded(path))
    }

    /// Downloads the assets of all records, logging failures
    ///
    /// Returns how many files were newly written.
    pub async fn save_all(&self, records: &[Record]) -> usize {
        let mut downloaded = 0;
        for record in records {
            match self.save(record).await {
                Ok(AssetOutcome::Downloaded(_)) => downloaded += 1,
                Ok(_) => {}
                Err(e) => tracing::warn!("{}", e),
            }
        }
        downloaded
    }
}

/// Replaces characters that are invalid in file names with `_`
pub fn safe_file_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect()
}

/// File extension taken from the URL path, `.jpg` when absent
///
/// Image CDNs append resize hints such as `@160w_220h_1e_1c`; those are
/// not part of the extension.
pub fn extension_of(url: &str) -> String {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    let file = path.rsplit('/').next().unwrap_or_default();

    file.rfind('.')
        .map(|dot| {
            file[dot + 1..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
        })
        .filter(|ext| !ext.is_empty() && ext.len() <= 5)
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
