//! Loading of `secret.json` with environment variable fallbacks.

use std::fs;
use std::path::PathBuf;

use pdfsh_core::config::{AnthropicSecret, GoogleSecret, SecretConfig};
use thiserror::Error;

pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const GOOGLE_ACCESS_TOKEN_ENV: &str = "GOOGLE_ACCESS_TOKEN";

#[derive(Error, Debug)]
pub enum SecretStorageError {
    // Messages never include file contents.
    #[error("Failed to read secret file at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse secret file at {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone)]
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads secrets from the file, then fills gaps from the process environment.
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        let from_file = self.load_file()?;
        Ok(with_env_fallback(from_file, |key| std::env::var(key).ok()))
    }

    fn load_file(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Ok(SecretConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| SecretStorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }

        serde_json::from_str(&content).map_err(|e| SecretStorageError::Parse {
            path: self.path.clone(),
            // Line and column only.
            message: format!("invalid JSON at line {} column {}", e.line(), e.column()),
        })
    }
}

/// Fills missing credentials from `lookup`. Values from the file win.
pub fn with_env_fallback(
    mut secrets: SecretConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SecretConfig {
    let present = |value: &Option<String>| value.as_ref().is_some_and(|v| !v.trim().is_empty());

    if secrets.anthropic_api_key().is_none() {
        let key = lookup(ANTHROPIC_API_KEY_ENV);
        if present(&key) {
            secrets.anthropic = key.map(|api_key| AnthropicSecret { api_key });
        }
    }
    if secrets.google_access_token().is_none() {
        let token = lookup(GOOGLE_ACCESS_TOKEN_ENV);
        if present(&token) {
            secrets.google = token.map(|access_token| GoogleSecret { access_token });
        }
    }
    secrets
}
