//! Document extraction through the poppler command line tools.
//!
//! `pdftotext` produces the text and `pdfinfo` the page count and metadata.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use pdfsh_core::document::{DocumentExtractor, DocumentMetadata, ExtractedText};
use pdfsh_core::error::ExtractionError;
use tokio::process::Command;

const PDFTOTEXT: &str = "pdftotext";
const PDFINFO: &str = "pdfinfo";
const METHOD: &str = "pdftotext";

#[derive(Debug, Clone, Default)]
pub struct PopplerExtractor;

impl PopplerExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentExtractor for PopplerExtractor {
    async fn extract_text(&self, path: &Path) -> Result<ExtractedText, ExtractionError> {
        let text = run_tool(
            PDFTOTEXT,
            &[OsStr::new("-layout"), path.as_os_str(), OsStr::new("-")],
        )
        .await?;
        let info = match run_tool(PDFINFO, &[path.as_os_str()]).await {
            Ok(info) => parse_pdfinfo(&info),
            // Text without a page count is still usable.
            Err(e) => {
                tracing::warn!("[PopplerExtractor] pdfinfo failed for {}: {}", path.display(), e);
                PdfInfo::default()
            }
        };

        let page_count = info.pages.unwrap_or_else(|| count_pages(&text));
        tracing::debug!(
            "[PopplerExtractor] Extracted {} chars from {} pages of {}",
            text.len(),
            page_count,
            path.display()
        );

        Ok(ExtractedText::new(text, page_count).with_metadata(DocumentMetadata {
            title: info.title,
            author: info.author,
            method: Some(METHOD.to_string()),
        }))
    }
}

async fn run_tool(tool: &'static str, args: &[&OsStr]) -> Result<String, ExtractionError> {
    let output = Command::new(tool)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => ExtractionError::ToolUnavailable {
                tool: tool.to_string(),
                message: "install poppler-utils".to_string(),
            },
            _ => ExtractionError::Failed(format!("{tool}: {e}")),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::Failed(format!("{tool}: {}", stderr.trim())));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct PdfInfo {
    pages: Option<usize>,
    title: Option<String>,
    author: Option<String>,
}

fn parse_pdfinfo(output: &str) -> PdfInfo {
    let mut info = PdfInfo::default();
    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "Pages" => info.pages = value.parse().ok(),
            "Title" => info.title = Some(value.to_string()),
            "Author" => info.author = Some(value.to_string()),
            _ => {}
        }
    }
    info
}

/// pdftotext separates pages with form feeds.
fn count_pages(text: &str) -> usize {
    let breaks = text.matches('\x0c').count();
    if text.trim_end_matches('\x0c').is_empty() {
        0
    } else if text.ends_with('\x0c') {
        breaks
    } else {
        breaks + 1
    }
}
