//! Core domain of the pdfsh interactive shell.
//!
//! This crate holds the session model, the command parser and table, the
//! analysis dispatcher and comparison engine, and the traits through which the
//! shell reaches its external collaborators. It performs no network I/O.

pub mod analysis;
pub mod archive;
pub mod cloud;
pub mod command;
pub mod comparison;
pub mod config;
pub mod document;
pub mod error;
pub mod history;
pub mod process;
pub mod session;
pub mod text;

pub use analysis::{AnalysisBackend, AnalysisDispatcher, AnalysisResult, AnalysisType};
pub use comparison::{ComparisonEngine, ComparisonResult};
pub use document::{Document, DocumentExtractor, DocumentRef, ExtractedText};
pub use error::{
    AnalysisError, BackendError, CloudError, ComparisonError, DocumentError, ExportError,
    ExtractionError, HistoryStoreError, ParseError, ShellError,
};
pub use history::{History, HistoryEntry, HistoryStore};
pub use session::Session;
