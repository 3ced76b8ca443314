//! Google Drive and Sheets collaborator interfaces.
//!
//! Authentication is entirely the implementation's concern.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CloudError;

/// A file stored in cloud storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    /// Size in bytes, when the provider reports one
    pub size: Option<u64>,
}

impl RemoteFile {
    /// Human readable size, e.g. "12.5 KB".
    pub fn display_size(&self) -> String {
        match self.size {
            Some(bytes) => format!("{:.1} KB", bytes as f64 / 1024.0),
            None => "unknown size".to_string(),
        }
    }
}

#[async_trait]
pub trait CloudStorage: Send + Sync {
    /// Lists up to `limit` PDF files.
    async fn list_files(&self, limit: usize) -> Result<Vec<RemoteFile>, CloudError>;

    /// Downloads a file into `dest_dir` and returns the local path.
    async fn download(&self, file_id: &str, dest_dir: &Path) -> Result<PathBuf, CloudError>;

    /// Uploads a local file and returns its remote id.
    async fn upload(&self, local_path: &Path) -> Result<String, CloudError>;
}

#[async_trait]
pub trait SpreadsheetExport: Send + Sync {
    /// Appends rows after the last row of the sheet.
    async fn append_rows(&self, sheet_id: &str, rows: Vec<Vec<String>>) -> Result<(), CloudError>;

    /// Browser URL of the spreadsheet.
    fn spreadsheet_url(&self, sheet_id: &str) -> String {
        format!("https://docs.google.com/spreadsheets/d/{sheet_id}")
    }
}
