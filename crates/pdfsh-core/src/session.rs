//! Session state: the open document, cached results and command history.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::analysis::{AnalysisResult, AnalysisType};
use crate::document::{Document, DocumentExtractor, load_document};
use crate::error::{DocumentError, HistoryStoreError};
use crate::history::{History, HistoryEntry};

/// Everything the shell knows about the current interactive session.
///
/// A `Session` is an owned value passed to every command handler. Updates are
/// applied only after the work that produces them has succeeded, so a failed or
/// aborted `open` leaves the previous state untouched.
pub struct Session {
    extractor: Arc<dyn DocumentExtractor>,
    current: Option<Document>,
    last_result: Option<AnalysisResult>,
    results: BTreeMap<AnalysisType, AnalysisResult>,
    history: History,
}

impl Session {
    /// Creates a session with no open document.
    pub fn new(extractor: Arc<dyn DocumentExtractor>, history: History) -> Self {
        Self {
            extractor,
            current: None,
            last_result: None,
            results: BTreeMap::new(),
            history,
        }
    }

    /// Opens `path` and makes it the current document.
    ///
    /// On success the previous document is replaced, the per-document result set is
    /// cleared and the last result becomes stale.
    pub async fn open(&mut self, path: impl AsRef<Path>) -> Result<&Document, DocumentError> {
        let document = load_document(self.extractor.as_ref(), path.as_ref()).await?;

        tracing::info!(
            "[Session] Opened {} ({} pages)",
            document.path().display(),
            document.page_count()
        );

        self.results.clear();
        Ok(&*self.current.insert(document))
    }

    /// Extracts `path` without touching the session's current document.
    pub async fn load_detached(&self, path: impl AsRef<Path>) -> Result<Document, DocumentError> {
        load_document(self.extractor.as_ref(), path.as_ref()).await
    }

    pub fn current(&self) -> Option<&Document> {
        self.current.as_ref()
    }

    /// Records a result.
    ///
    /// Results for a document other than the current one are kept only as the
    /// (stale) last result and never join the per-document result set.
    pub fn set_result(&mut self, result: AnalysisResult) {
        let is_current = self
            .current
            .as_ref()
            .is_some_and(|doc| result.belongs_to(doc));

        if is_current {
            self.results.insert(result.analysis_type, result.clone());
        } else {
            tracing::warn!(
                "[Session] Storing result for {} which is not the open document",
                result.document.path.display()
            );
        }
        self.last_result = Some(result);
    }

    /// The most recent result, if it belongs to the currently open document.
    pub fn last_result(&self) -> Option<&AnalysisResult> {
        match (&self.last_result, &self.current) {
            (Some(result), Some(doc)) if result.belongs_to(doc) => Some(result),
            _ => None,
        }
    }

    /// The most recent result when it was produced for a document that is no
    /// longer open.
    pub fn stale_result(&self) -> Option<&AnalysisResult> {
        match (&self.last_result, &self.current) {
            (Some(result), Some(doc)) if result.belongs_to(doc) => None,
            (result, _) => result.as_ref(),
        }
    }

    /// Every result produced for the current document, one per analysis type.
    pub fn results(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.values()
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    /// Appends to the command history.
    pub fn append_history(&mut self, entry: HistoryEntry) -> Result<(), HistoryStoreError> {
        self.history.append(entry)
    }

    /// Command history, most recent last.
    pub fn history(&self) -> &History {
        &self.history
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current", &self.current.as_ref().map(|d| d.path().to_path_buf()))
            .field("last_result", &self.last_result.as_ref().map(|r| r.analysis_type))
            .field("results", &self.results.len())
            .field("history", &self.history)
            .finish()
    }
}
