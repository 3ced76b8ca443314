//! Loading of `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use pdfsh_core::config::ShellConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigStorageError {
    #[error("Failed to read config file at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Reads [`ShellConfig`] from a TOML file.
#[derive(Debug, Clone)]
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration.
    ///
    /// A missing or empty file yields the defaults; a file that exists but
    /// cannot be read or parsed is an error.
    pub fn load(&self) -> Result<ShellConfig, ConfigStorageError> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigStorage] {} not found, using defaults",
                self.path.display()
            );
            return Ok(ShellConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| ConfigStorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(ShellConfig::default());
        }

        toml::from_str(&content).map_err(|source| ConfigStorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfsh_core::config::BackendProvider;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigStorage::new(dir.path().join("config.toml")).load().unwrap();
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn test_partial_file_is_merged_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[history]
max_entries = 50

[backend]
provider = "claude"

[google]
sheet_id = "sheet-123"
"#,
        )
        .unwrap();

        let config = ConfigStorage::new(&path).load().unwrap();

        assert_eq!(config.history.max_entries, 50);
        assert_eq!(config.backend.provider, BackendProvider::Claude);
        assert_eq!(config.backend.max_tokens, 2000);
        assert_eq!(config.google.sheet_id.as_deref(), Some("sheet-123"));
        assert_eq!(config.google.drive_folder_id, None);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[backend]\nprovider = \"gpt\"\n").unwrap();

        let err = ConfigStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, ConfigStorageError::Parse { .. }));
    }
}
