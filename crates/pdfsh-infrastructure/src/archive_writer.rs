//! Writes [`ArchiveRecord`]s as pretty-printed JSON files.

use std::path::{Path, PathBuf};

use pdfsh_core::archive::ArchiveRecord;
use pdfsh_core::error::ExportError;

use crate::storage::write_atomic;

#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    dir: PathBuf,
}

impl ArchiveWriter {
    /// Archives are written into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `record` and returns the path of the new file.
    pub fn write(&self, record: &ArchiveRecord) -> Result<PathBuf, ExportError> {
        let path = self.dir.join(record.file_name());
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| ExportError::Serialization(e.to_string()))?;

        write_atomic(&path, json.as_bytes()).map_err(|e| ExportError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        tracing::info!("[ArchiveWriter] Saved results to {}", path.display());
        Ok(path)
    }
}
