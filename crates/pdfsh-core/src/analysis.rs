//! Analysis types, results, the backend capability and the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::document::{Document, DocumentRef};
use crate::error::{AnalysisError, BackendError, ShellError};
use crate::session::Session;

/// The fixed set of analyses a backend can run.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AnalysisType {
    Summary,
    Keywords,
    Entities,
    Technical,
    #[default]
    Comprehensive,
}

impl AnalysisType {
    /// Parses a user supplied token.
    pub fn parse(token: &str) -> Result<Self, AnalysisError> {
        token
            .trim()
            .parse()
            .map_err(|_| AnalysisError::UnknownType(token.to_string()))
    }

    /// All type names in declaration order.
    pub fn names() -> Vec<&'static str> {
        Self::iter().map(<&'static str>::from).collect()
    }
}


/// Output of one backend analysis against a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub document: DocumentRef,
    pub analysis_type: AnalysisType,
    pub content: String,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(document: DocumentRef, analysis_type: AnalysisType, content: String) -> Self {
        Self {
            document,
            analysis_type,
            content,
            generated_at: Utc::now(),
        }
    }

    /// Whether this result was produced from `document`.
    pub fn belongs_to(&self, document: &Document) -> bool {
        self.document.id == document.id()
    }
}

/// Capability implemented by every analysis provider.
///
/// Implementations own their retry, backoff and timeout policy; the dispatcher
/// calls each backend exactly once per request.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Short provider name for display and logs.
    fn name(&self) -> &str;

    async fn analyze(&self, text: &str, analysis_type: AnalysisType) -> Result<String, BackendError>;
}

/// Routes analysis requests to the configured backend.
#[derive(Clone)]
pub struct AnalysisDispatcher {
    backend: Arc<dyn AnalysisBackend>,
}

impl AnalysisDispatcher {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Analyzes `document` with the type named by `token`.
    ///
    /// Unknown tokens fail before the backend is contacted.
    pub async fn analyze(
        &self,
        document: &Document,
        token: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let analysis_type = AnalysisType::parse(token)?;
        self.run(document, analysis_type).await
    }

    /// Analyzes `document` with an already validated type.
    pub async fn run(
        &self,
        document: &Document,
        analysis_type: AnalysisType,
    ) -> Result<AnalysisResult, AnalysisError> {
        if document.raw_text().is_empty() {
            return Err(AnalysisError::EmptyDocument);
        }

        tracing::info!(
            "[Dispatcher] Running {} analysis on {} via {}",
            analysis_type,
            document.path().display(),
            self.backend.name()
        );

        let content = self
            .backend
            .analyze(document.raw_text(), analysis_type)
            .await
            .map_err(|err| {
                tracing::warn!("[Dispatcher] {} backend failed: {}", self.backend.name(), err);
                AnalysisError::from(err)
            })?;

        Ok(AnalysisResult::new(
            document.reference(),
            analysis_type,
            normalize_content(&content),
        ))
    }

    /// Analyzes the session's current document and stores the result in the session.
    ///
    /// A failed analysis leaves the session's previous result untouched.
    pub async fn analyze_current(
        &self,
        session: &mut Session,
        token: &str,
    ) -> Result<AnalysisResult, ShellError> {
        let analysis_type = AnalysisType::parse(token)?;
        let document = session.current().ok_or(ShellError::NoDocumentOpen)?;
        let result = self.run(document, analysis_type).await?;
        session.set_result(result.clone());
        Ok(result)
    }
}

/// Trims surrounding whitespace and normalizes line endings.
fn normalize_content(content: &str) -> String {
    content.replace("\r\n", "\n").trim().to_string()
}
