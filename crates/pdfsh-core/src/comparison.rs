//! Two-document comparison.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisDispatcher, AnalysisType};
use crate::document::{Document, DocumentRef};
use crate::error::ComparisonError;
use crate::text;

/// How many of each analysis' most frequent terms take part in the comparison.
pub const DEFAULT_TOP_TERMS: usize = 20;

/// Terms present in only one of the two analyses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Differences {
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
}

/// Structured contrast of two documents' analyses. Document A always comes first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub doc_a: DocumentRef,
    pub doc_b: DocumentRef,
    /// Top terms shared by both analyses, sorted
    pub similarities: Vec<String>,
    pub differences: Differences,
    /// Jaccard similarity of the full term sets, in percent
    pub similarity: f64,
    pub generated_at: DateTime<Utc>,
}

/// Compares documents by running a comprehensive analysis on each.
#[derive(Clone)]
pub struct ComparisonEngine {
    dispatcher: AnalysisDispatcher,
    top_terms: usize,
}

impl ComparisonEngine {
    pub fn new(dispatcher: AnalysisDispatcher) -> Self {
        Self {
            dispatcher,
            top_terms: DEFAULT_TOP_TERMS,
        }
    }

    pub fn with_top_terms(mut self, top_terms: usize) -> Self {
        self.top_terms = top_terms.max(1);
        self
    }

    /// Compares `a` against `b`.
    ///
    /// Documents resolving to the same path are rejected before any backend call.
    pub async fn compare(
        &self,
        a: &Document,
        b: &Document,
    ) -> Result<ComparisonResult, ComparisonError> {
        if a.path() == b.path() {
            return Err(ComparisonError::IdenticalPath {
                path: a.path().to_path_buf(),
            });
        }

        tracing::info!(
            "[Comparison] Comparing {} with {}",
            a.path().display(),
            b.path().display()
        );

        let analysis_a = self.dispatcher.run(a, AnalysisType::Comprehensive).await?;
        let analysis_b = self.dispatcher.run(b, AnalysisType::Comprehensive).await?;

        Ok(self.combine(a, b, &analysis_a.content, &analysis_b.content))
    }

    fn combine(&self, a: &Document, b: &Document, content_a: &str, content_b: &str) -> ComparisonResult {
        let top_a = text::top_terms(content_a, self.top_terms);
        let top_b = text::top_terms(content_b, self.top_terms);

        let similarities = top_a.intersection(&top_b).cloned().collect();
        let differences = Differences {
            only_in_a: difference(&top_a, &top_b),
            only_in_b: difference(&top_b, &top_a),
        };

        let similarity =
            text::jaccard_percent(&text::vocabulary(content_a), &text::vocabulary(content_b));

        ComparisonResult {
            doc_a: a.reference(),
            doc_b: b.reference(),
            similarities,
            differences,
            similarity,
            generated_at: Utc::now(),
        }
    }
}

fn difference(left: &BTreeSet<String>, right: &BTreeSet<String>) -> Vec<String> {
    left.difference(right).cloned().collect()
}
