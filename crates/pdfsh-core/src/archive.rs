//! The saved-results record written by `save` and uploaded by `export`.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisType;
use crate::error::ShellError;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub pages: usize,
    pub title: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedAnalysis {
    pub content: String,
    pub generated_at: DateTime<Utc>,
}

/// All results for one document, as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub pdf_file: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: ArchiveMetadata,
    pub analyses: BTreeMap<AnalysisType, ArchivedAnalysis>,
}

impl ArchiveRecord {
    /// Snapshots the current document's results.
    pub fn from_session(session: &Session) -> Result<Self, ShellError> {
        let document = session.current().ok_or(ShellError::NoDocumentOpen)?;
        if !session.has_results() {
            return Err(ShellError::NoResults);
        }

        let analyses = session
            .results()
            .map(|r| {
                (
                    r.analysis_type,
                    ArchivedAnalysis {
                        content: r.content.clone(),
                        generated_at: r.generated_at,
                    },
                )
            })
            .collect();

        Ok(Self {
            pdf_file: document.path().display().to_string(),
            timestamp: Utc::now(),
            metadata: ArchiveMetadata {
                pages: document.page_count(),
                title: document.metadata().title.clone(),
                author: document.metadata().author.clone(),
            },
            analyses,
        })
    }

    /// `analysis_<stem>_<YYYYmmdd_HHMMSS>.json`, in local time.
    pub fn file_name(&self) -> String {
        let stem = std::path::Path::new(&self.pdf_file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let stamp = self.timestamp.with_timezone(&Local).format("%Y%m%d_%H%M%S");
        format!("analysis_{stem}_{stamp}.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisResult;
    use crate::document::{DocumentExtractor, DocumentMetadata, ExtractedText};
    use crate::error::ExtractionError;
    use crate::history::History;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedExtractor;

    #[async_trait]
    impl DocumentExtractor for FixedExtractor {
        async fn extract_text(&self, _path: &Path) -> Result<ExtractedText, ExtractionError> {
            Ok(ExtractedText::new("some text", 4).with_metadata(DocumentMetadata {
                title: Some("Annual Report".into()),
                author: None,
                method: Some("fixed".into()),
            }))
        }
    }

    #[tokio::test]
    async fn test_record_requires_results() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, "x").unwrap();
        let mut session = Session::new(Arc::new(FixedExtractor), History::in_memory(10));

        assert_eq!(
            ArchiveRecord::from_session(&session),
            Err(ShellError::NoDocumentOpen)
        );

        let doc = session.open(&path).await.unwrap().reference();
        assert_eq!(ArchiveRecord::from_session(&session), Err(ShellError::NoResults));

        session.set_result(AnalysisResult::new(doc, AnalysisType::Summary, "short".into()));
        let record = ArchiveRecord::from_session(&session).unwrap();

        assert_eq!(record.metadata.pages, 4);
        assert_eq!(record.metadata.title.as_deref(), Some("Annual Report"));
        assert_eq!(record.analyses[&AnalysisType::Summary].content, "short");
        assert!(record.file_name().starts_with("analysis_report_"));
        assert!(record.file_name().ends_with(".json"));

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["analyses"]["summary"]["content"].is_string());
    }
}
