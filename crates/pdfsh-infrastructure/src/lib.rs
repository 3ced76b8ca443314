pub mod archive_writer;
pub mod paths;
pub mod pdf_extractor;
pub mod process_runner;
pub mod storage;

pub use crate::archive_writer::ArchiveWriter;
pub use crate::paths::{PathError, PdfshPaths};
pub use crate::pdf_extractor::PopplerExtractor;
pub use crate::process_runner::SystemProcessRunner;
pub use crate::storage::{ConfigStorage, FileHistoryStore, SecretStorage};
