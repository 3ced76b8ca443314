//! ClaudeBackend - analysis through the Anthropic Messages REST API.
//!
//! Transport failures and rate limits are retried here, up to `max_retries`
//! times, so the core never has to.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use pdfsh_core::analysis::{AnalysisBackend, AnalysisType};
use pdfsh_core::config::{DEFAULT_MAX_RETRIES, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use pdfsh_core::error::BackendError;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};

use crate::prompts;

const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const BASE_BACKOFF: Duration = Duration::from_millis(500);
const TEMPERATURE: f32 = 0.7;

/// Backend implementation that talks to the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    max_retries: u32,
    base_backoff: Duration,
}

impl ClaudeBackend {
    /// Creates a backend with the provided API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_retries: DEFAULT_MAX_RETRIES,
            base_backoff: BASE_BACKOFF,
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Points the backend at another endpoint, e.g. a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_base_backoff(mut self, delay: Duration) -> Self {
        self.base_backoff = delay;
        self
    }

    fn build_request(&self, text: &str, analysis_type: AnalysisType) -> CreateMessageRequest {
        CreateMessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
            system: prompts::SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompts::user_message(analysis_type, text),
            }],
        }
    }

    async fn send_request(&self, body: &CreateMessageRequest) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| BackendError::Transport(format!("Claude API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, &body_text, retry_after));
        }

        let parsed: CreateMessageResponse = response
            .json()
            .await
            .map_err(|err| BackendError::Transport(format!("Failed to parse Claude response: {err}")))?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl AnalysisBackend for ClaudeBackend {
    fn name(&self) -> &str {
        "claude"
    }

    async fn analyze(&self, text: &str, analysis_type: AnalysisType) -> Result<String, BackendError> {
        let request = self.build_request(text, analysis_type);
        tracing::info!(
            "[ClaudeBackend] Requesting {} analysis from {}",
            analysis_type,
            self.model
        );
        with_retries(self.max_retries, self.base_backoff, || self.send_request(&request)).await
    }
}

/// Runs `op`, retrying transport errors and rate limits.
///
/// A rate limit waits for the server's `retry-after` when given, otherwise the
/// exponential backoff. Authentication errors are returned at once.
pub(crate) async fn with_retries<F, Fut>(
    max_retries: u32,
    base_backoff: Duration,
    mut op: F,
) -> Result<String, BackendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, BackendError>>,
{
    let mut attempt = 0;
    loop {
        let err = match op().await {
            Ok(content) => return Ok(content),
            Err(err) => err,
        };

        let delay = match &err {
            BackendError::Auth(_) => return Err(err),
            _ if attempt >= max_retries => return Err(err),
            BackendError::RateLimited {
                retry_after: Some(delay),
            } => *delay,
            _ => base_backoff * 2u32.saturating_pow(attempt),
        };

        attempt += 1;
        tracing::warn!(
            "[ClaudeBackend] Attempt {} failed ({}), retrying in {:?}",
            attempt,
            err,
            delay
        );
        tokio::time::sleep(delay).await;
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: CreateMessageResponse) -> Result<String, BackendError> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
            ContentBlockResponse::Other => None,
        })
        .ok_or_else(|| {
            BackendError::Transport("Claude API returned no text in the response content".into())
        })
}

fn map_http_error(status: StatusCode, body: &str, retry_after: Option<Duration>) -> BackendError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimited { retry_after },
        _ => BackendError::Transport(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
