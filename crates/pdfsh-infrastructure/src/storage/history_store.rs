//! Line-oriented, append-only history file.
//!
//! Each line is one JSON-encoded [`HistoryEntry`]. The file is read once at
//! startup and then appended to through a single handle kept for the life of
//! the process.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use pdfsh_core::error::HistoryStoreError;
use pdfsh_core::history::{HistoryEntry, HistoryStore};

use super::atomic::write_atomic;

pub struct FileHistoryStore {
    path: PathBuf,
    writer: File,
}

impl FileHistoryStore {
    /// Opens (creating if needed) the history file for appending.
    ///
    /// Fails when the file or its directory cannot be created or opened for
    /// writing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryStoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(&path, e))?;
        }
        let writer = open_append(&path)?;

        tracing::debug!("[HistoryStore] Opened {}", path.display());
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryStoreError> {
        let file = File::open(&self.path).map_err(|e| io_error(&self.path, e))?;
        let mut entries = Vec::new();

        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| io_error(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEntry>(&line) {
                Ok(entry) => entries.push(entry),
                // A torn final write must not block startup.
                Err(e) => tracing::warn!(
                    "[HistoryStore] Skipping malformed line {} in {}: {}",
                    idx + 1,
                    self.path.display(),
                    e
                ),
            }
        }

        Ok(entries)
    }

    fn append(&mut self, entry: &HistoryEntry) -> Result<(), HistoryStoreError> {
        let mut line = encode(entry, 0)?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|e| io_error(&self.path, e))
    }

    fn rewrite(&mut self, entries: &[HistoryEntry]) -> Result<(), HistoryStoreError> {
        let mut contents = String::new();
        for (idx, entry) in entries.iter().enumerate() {
            contents.push_str(&encode(entry, idx + 1)?);
            contents.push('\n');
        }
        write_atomic(&self.path, contents.as_bytes()).map_err(|e| io_error(&self.path, e))?;

        // The rename replaced the file the old handle pointed at.
        self.writer = open_append(&self.path)?;
        tracing::info!(
            "[HistoryStore] Compacted {} to {} entries",
            self.path.display(),
            entries.len()
        );
        Ok(())
    }
}

fn open_append(path: &Path) -> Result<File, HistoryStoreError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_error(path, e))
}

fn encode(entry: &HistoryEntry, line: usize) -> Result<String, HistoryStoreError> {
    serde_json::to_string(entry).map_err(|e| HistoryStoreError::Serialization {
        line,
        message: e.to_string(),
    })
}

fn io_error(path: &Path, e: std::io::Error) -> HistoryStoreError {
    HistoryStoreError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
