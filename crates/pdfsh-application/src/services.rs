//! Collaborators the shell dispatches to.

use std::sync::Arc;

use pdfsh_core::analysis::{AnalysisBackend, AnalysisDispatcher};
use pdfsh_core::cloud::{CloudStorage, SpreadsheetExport};
use pdfsh_core::comparison::ComparisonEngine;
use pdfsh_core::process::ProcessRunner;

/// Everything a [`Shell`](crate::Shell) needs besides its session.
///
/// Drive and Sheets are optional; commands that need them report that they
/// are not configured.
#[derive(Clone)]
pub struct ShellServices {
    pub(crate) dispatcher: AnalysisDispatcher,
    pub(crate) comparison: ComparisonEngine,
    pub(crate) process_runner: Arc<dyn ProcessRunner>,
    pub(crate) cloud_storage: Option<Arc<dyn CloudStorage>>,
    pub(crate) spreadsheet: Option<SpreadsheetTarget>,
}

#[derive(Clone)]
pub(crate) struct SpreadsheetTarget {
    pub(crate) client: Arc<dyn SpreadsheetExport>,
    pub(crate) sheet_id: String,
}

impl ShellServices {
    pub fn new(backend: Arc<dyn AnalysisBackend>, process_runner: Arc<dyn ProcessRunner>) -> Self {
        let dispatcher = AnalysisDispatcher::new(backend);
        Self {
            comparison: ComparisonEngine::new(dispatcher.clone()),
            dispatcher,
            process_runner,
            cloud_storage: None,
            spreadsheet: None,
        }
    }

    pub fn with_cloud_storage(mut self, storage: Arc<dyn CloudStorage>) -> Self {
        self.cloud_storage = Some(storage);
        self
    }

    /// Rows exported by `sheets` are appended to `sheet_id`.
    pub fn with_spreadsheet(
        mut self,
        client: Arc<dyn SpreadsheetExport>,
        sheet_id: impl Into<String>,
    ) -> Self {
        self.spreadsheet = Some(SpreadsheetTarget {
            client,
            sheet_id: sheet_id.into(),
        });
        self
    }

    pub fn backend_name(&self) -> &str {
        self.dispatcher.backend_name()
    }
}
