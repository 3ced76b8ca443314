//! Per-user path management for pdfsh.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/pdfsh/             # Config directory
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API keys and access tokens
//! ├── history.jsonl            # Command history, one entry per line
//! └── logs/                    # Application logs
//!     └── pdfsh.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

const APP_DIR: &str = "pdfsh";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The platform config directory could not be determined.
    #[error("Cannot find the user configuration directory")]
    ConfigDirNotFound,
}

/// Resolved locations of every per-user file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfshPaths {
    base: PathBuf,
}

impl PdfshPaths {
    /// Uses `base_path` as the pdfsh directory when given, otherwise
    /// `<config_dir>/pdfsh`.
    pub fn new(base_path: Option<&Path>) -> Result<Self, PathError> {
        let base = match base_path {
            Some(path) => path.to_path_buf(),
            None => dirs::config_dir()
                .ok_or(PathError::ConfigDirNotFound)?
                .join(APP_DIR),
        };
        Ok(Self { base })
    }

    pub fn config_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    /// Ensure this file has restrictive permissions (e.g. 600).
    pub fn secret_file(&self) -> PathBuf {
        self.base.join("secret.json")
    }

    pub fn history_file(&self) -> PathBuf {
        self.base.join("history.jsonl")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_base() {
        let paths = PdfshPaths::new(Some(Path::new("/tmp/pdfsh-test"))).unwrap();

        assert_eq!(paths.config_dir(), Path::new("/tmp/pdfsh-test"));
        assert_eq!(paths.config_file(), Path::new("/tmp/pdfsh-test/config.toml"));
        assert_eq!(paths.secret_file(), Path::new("/tmp/pdfsh-test/secret.json"));
        assert_eq!(paths.history_file(), Path::new("/tmp/pdfsh-test/history.jsonl"));
        assert_eq!(paths.logs_dir(), Path::new("/tmp/pdfsh-test/logs"));
    }
}
