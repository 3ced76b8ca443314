//! Documents opened into the shell.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DocumentError, ExtractionError};

/// Descriptive metadata reported by the extraction collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Name of the extraction method that produced the text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Output of the document extraction collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
    pub metadata: DocumentMetadata,
}

impl ExtractedText {
    pub fn new(text: impl Into<String>, page_count: usize) -> Self {
        Self {
            text: text.into(),
            page_count,
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Turns a PDF file into text.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extracts the full text and page count of the file at `path`.
    async fn extract_text(&self, path: &Path) -> Result<ExtractedText, ExtractionError>;
}

/// Identity of a document, used by results to point back at their source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub path: PathBuf,
}

impl DocumentRef {
    /// File name component of the path, falling back to the full path.
    pub fn file_name(&self) -> Cow<'_, str> {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => self.path.to_string_lossy(),
        }
    }
}

/// An opened PDF: extracted text plus metadata.
///
/// Documents are immutable once extracted. Opening another file replaces the
/// session's document instead of mutating this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: String,
    path: PathBuf,
    raw_text: String,
    page_count: usize,
    metadata: DocumentMetadata,
    extracted_at: DateTime<Utc>,
}

impl Document {
    /// Builds a document from extraction output. `path` should already be resolved.
    pub fn new(path: PathBuf, extracted: ExtractedText) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            path,
            raw_text: extracted.text,
            page_count: extracted.page_count,
            metadata: extracted.metadata,
            extracted_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn extracted_at(&self) -> DateTime<Utc> {
        self.extracted_at
    }

    pub fn reference(&self) -> DocumentRef {
        DocumentRef {
            id: self.id.clone(),
            path: self.path.clone(),
        }
    }

    pub fn file_name(&self) -> Cow<'_, str> {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => self.path.to_string_lossy(),
        }
    }

    /// Returns at most `max_chars` characters of the text, with `...` appended
    /// when the text was cut.
    pub fn preview(&self, max_chars: usize) -> Cow<'_, str> {
        match self.raw_text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => Cow::Owned(format!("{}...", &self.raw_text[..byte_idx])),
            None => Cow::Borrowed(&self.raw_text),
        }
    }

    pub fn has_text(&self) -> bool {
        !self.raw_text.trim().is_empty()
    }
}

/// Resolves `path` to a canonical path of an existing regular file.
pub fn resolve_path(path: &Path) -> Result<PathBuf, DocumentError> {
    match std::fs::canonicalize(path) {
        Ok(resolved) if resolved.is_file() => Ok(resolved),
        _ => Err(DocumentError::not_found(path)),
    }
}

/// Resolves and extracts `path` into a new [`Document`].
pub async fn load_document(
    extractor: &dyn DocumentExtractor,
    path: &Path,
) -> Result<Document, DocumentError> {
    let resolved = resolve_path(path)?;

    let extracted = extractor
        .extract_text(&resolved)
        .await
        .map_err(|source| DocumentError::ExtractionFailed {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(
        "[Document] Extracted {} chars from {} ({} pages)",
        extracted.text.len(),
        resolved.display(),
        extracted.page_count
    );

    Ok(Document::new(resolved, extracted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let doc = Document::new(
            PathBuf::from("/tmp/a.pdf"),
            ExtractedText::new("ééééé", 1),
        );
        assert_eq!(doc.preview(3), "ééé...");
        assert_eq!(doc.preview(10), "ééééé");
    }

    #[test]
    fn test_resolve_path_rejects_directories_and_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        assert!(resolve_path(temp_dir.path()).unwrap_err().is_not_found());
        assert!(
            resolve_path(&temp_dir.path().join("missing.pdf"))
                .unwrap_err()
                .is_not_found()
        );

        let file = temp_dir.path().join("present.pdf");
        std::fs::write(&file, "x").unwrap();
        assert!(resolve_path(&file).is_ok());
    }

    #[test]
    fn test_each_document_gets_a_fresh_id() {
        let a = Document::new(PathBuf::from("/tmp/a.pdf"), ExtractedText::new("a", 1));
        let b = Document::new(PathBuf::from("/tmp/a.pdf"), ExtractedText::new("a", 1));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.file_name(), "a.pdf");
    }
}
