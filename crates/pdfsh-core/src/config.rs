//! Configuration types for `config.toml` and `secret.json`.
//!
//! Loading lives in `pdfsh-infrastructure`; these are the shapes only. Every
//! field has a default so a partial or missing file is valid.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::history::DEFAULT_MAX_ENTRIES;

pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub history: HistoryConfig,
    pub backend: BackendConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// FIFO cap on retained entries
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Which analysis backend to use.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendProvider {
    /// Offline heuristics
    #[default]
    Local,
    /// Anthropic Messages API
    Claude,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub provider: BackendProvider,
    pub model: String,
    pub max_tokens: u32,
    /// Retries performed inside the backend on transport errors and rate limits
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: BackendProvider::default(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Target spreadsheet for `sheets`
    pub sheet_id: Option<String>,
    /// Parent folder for uploads
    pub drive_folder_id: Option<String>,
}

/// Root of `secret.json`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    pub anthropic: Option<AnthropicSecret>,
    pub google: Option<GoogleSecret>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnthropicSecret {
    pub api_key: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSecret {
    pub access_token: String,
}

impl SecretConfig {
    pub fn anthropic_api_key(&self) -> Option<&str> {
        self.anthropic
            .as_ref()
            .map(|s| s.api_key.as_str())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn google_access_token(&self) -> Option<&str> {
        self.google
            .as_ref()
            .map(|s| s.access_token.as_str())
            .filter(|t| !t.trim().is_empty())
    }
}

// Never print credentials.
impl std::fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretConfig")
            .field("anthropic", &self.anthropic_api_key().map(|_| "<redacted>"))
            .field("google", &self.google_access_token().map(|_| "<redacted>"))
            .finish()
    }
}
