//! Network-facing collaborators: analysis backends and Google clients.

pub mod claude_backend;
pub mod google;
pub mod local_backend;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use pdfsh_core::analysis::{AnalysisBackend, AnalysisType};
use pdfsh_core::config::{BackendConfig, BackendProvider, SecretConfig};
use pdfsh_core::error::BackendError;

pub use claude_backend::ClaudeBackend;
pub use google::{GoogleDriveClient, GoogleSheetsClient};
pub use local_backend::LocalBackend;

const MISSING_API_KEY: &str =
    "no API key configured (set anthropic.api_key in secret.json or ANTHROPIC_API_KEY)";

/// Builds the analysis backend selected by `config`.
///
/// A Claude provider without an API key still yields a backend; every
/// analysis it runs fails with [`BackendError::Auth`].
pub fn create_backend(config: &BackendConfig, secrets: &SecretConfig) -> Arc<dyn AnalysisBackend> {
    match config.provider {
        BackendProvider::Local => Arc::new(LocalBackend::new()),
        BackendProvider::Claude => match secrets.anthropic_api_key() {
            Some(api_key) => Arc::new(
                ClaudeBackend::new(api_key)
                    .with_model(config.model.clone())
                    .with_max_tokens(config.max_tokens)
                    .with_max_retries(config.max_retries),
            ),
            None => {
                tracing::warn!("[Backend] Claude selected without an API key, analysis disabled");
                Arc::new(UnconfiguredBackend { name: "claude" })
            }
        },
    }
}

/// Stands in for a provider whose credentials are missing.
struct UnconfiguredBackend {
    name: &'static str,
}

#[async_trait]
impl AnalysisBackend for UnconfiguredBackend {
    fn name(&self) -> &str {
        self.name
    }

    async fn analyze(&self, _text: &str, _analysis_type: AnalysisType) -> Result<String, BackendError> {
        Err(BackendError::Auth(MISSING_API_KEY.to_string()))
    }
}
