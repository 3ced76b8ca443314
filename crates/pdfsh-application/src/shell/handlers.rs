//! Command handlers. Each returns the output to render or the error to report.

use std::path::{Path, PathBuf};

use pdfsh_core::archive::ArchiveRecord;
use pdfsh_core::command::{builtin_commands, is_pdf_name};
use pdfsh_core::comparison::ComparisonResult;
use pdfsh_core::document::Document;
use pdfsh_core::error::ShellError;
use pdfsh_infrastructure::ArchiveWriter;

use super::Shell;
use crate::output::{CommandOutcome, CommandStatus, OutputLine};

/// Characters of text shown after `open`.
pub const PREVIEW_CHARS: usize = 300;
/// Files shown by `google` without an argument.
pub const DRIVE_LIST_LIMIT: usize = 10;

const BANNER_RULE: &str = "============================================================";

impl Shell {
    /// Lines shown at startup and after `clear`.
    pub fn banner(&self) -> Vec<OutputLine> {
        vec![
            OutputLine::Heading(BANNER_RULE.to_string()),
            OutputLine::Heading("pdfsh - interactive PDF analysis shell".to_string()),
            OutputLine::Heading(BANNER_RULE.to_string()),
            OutputLine::Info(format!(
                "Analysis backend: {}. Type 'help' for commands, Tab to complete.",
                self.backend_name()
            )),
        ]
    }

    pub(super) async fn open(&mut self, path: impl AsRef<Path>) -> Result<CommandOutcome, ShellError> {
        let path = self.resolve(path);
        let document = self.session.open(&path).await?;
        Ok(CommandOutcome::new(document_summary(document)))
    }

    pub(super) fn list(&self) -> Result<CommandOutcome, ShellError> {
        let files = pdf_files(&self.working_dir);
        if files.is_empty() {
            return Ok(CommandOutcome::new(vec![OutputLine::Warning(
                "No PDF files found in current directory".to_string(),
            )]));
        }

        let mut lines = vec![OutputLine::Heading("PDF files in current directory:".to_string())];
        lines.extend(files.iter().enumerate().map(|(idx, (name, size))| {
            OutputLine::Body(format!("{:>3}. {} ({:.1} KB)", idx + 1, name, *size as f64 / 1024.0))
        }));
        Ok(CommandOutcome::new(lines))
    }

    pub(super) async fn analyze(&mut self, token: &str) -> Result<CommandOutcome, ShellError> {
        let result = self
            .services
            .dispatcher
            .analyze_current(&mut self.session, token)
            .await?;

        let mut lines = vec![OutputLine::Heading(format!(
            "{} analysis of {} ({})",
            capitalize(result.analysis_type.as_ref()),
            result.document.file_name(),
            self.backend_name()
        ))];
        lines.extend(body_lines(&result.content));
        Ok(CommandOutcome::new(lines))
    }

    pub(super) async fn compare(&mut self, path: &str) -> Result<CommandOutcome, ShellError> {
        let current = self.session.current().ok_or(ShellError::NoDocumentOpen)?;
        let other = self.session.load_detached(self.resolve(path)).await?;

        let result = self.services.comparison.compare(&other, current).await?;
        let lines = comparison_lines(&result);
        self.last_comparison = Some(result);
        Ok(CommandOutcome::new(lines))
    }

    pub(super) fn save(&self) -> Result<CommandOutcome, ShellError> {
        let path = self.write_archive()?;
        Ok(CommandOutcome::new(vec![OutputLine::Success(format!(
            "Results saved to {}",
            path.display()
        ))]))
    }

    pub(super) async fn export(&self) -> Result<CommandOutcome, ShellError> {
        let storage = self
            .services
            .cloud_storage
            .as_ref()
            .ok_or(ShellError::NotConfigured("Google Drive"))?;

        let path = self.write_archive()?;
        let file_id = storage.upload(&path).await?;
        Ok(CommandOutcome::new(vec![
            OutputLine::Success(format!("Results saved to {}", path.display())),
            OutputLine::Success(format!("Uploaded to Google Drive (file id: {file_id})")),
        ]))
    }

    pub(super) async fn google(&mut self, file_id: Option<&str>) -> Result<CommandOutcome, ShellError> {
        let storage = self
            .services
            .cloud_storage
            .clone()
            .ok_or(ShellError::NotConfigured("Google Drive"))?;

        let Some(file_id) = file_id else {
            let files = storage.list_files(DRIVE_LIST_LIMIT).await?;
            if files.is_empty() {
                return Ok(CommandOutcome::new(vec![OutputLine::Warning(
                    "No PDF files found on Google Drive".to_string(),
                )]));
            }
            let mut lines = vec![OutputLine::Heading("PDF files on Google Drive:".to_string())];
            lines.extend(files.iter().enumerate().map(|(idx, file)| {
                OutputLine::Body(format!(
                    "{:>3}. {} ({}) [{}]",
                    idx + 1,
                    file.name,
                    file.display_size(),
                    file.id
                ))
            }));
            lines.push(OutputLine::Info("Use 'google <file-id>' to download and open a file".to_string()));
            return Ok(CommandOutcome::new(lines));
        };

        let local = storage.download(file_id, &self.working_dir).await?;
        let mut lines = vec![OutputLine::Success(format!("Downloaded to {}", local.display()))];
        lines.extend(self.open(&local).await?.lines);
        Ok(CommandOutcome::new(lines))
    }

    pub(super) async fn sheets(&self) -> Result<CommandOutcome, ShellError> {
        let target = self
            .services
            .spreadsheet
            .as_ref()
            .ok_or(ShellError::NotConfigured("Google Sheets"))?;
        if self.session.current().is_none() {
            return Err(ShellError::NoDocumentOpen);
        }
        if !self.session.has_results() {
            return Err(ShellError::NoResults);
        }

        let rows: Vec<Vec<String>> = self
            .session
            .results()
            .map(|r| {
                vec![
                    r.document.file_name().into_owned(),
                    r.analysis_type.to_string(),
                    r.content.clone(),
                    r.generated_at.to_rfc3339(),
                ]
            })
            .collect();
        let count = rows.len();

        target.client.append_rows(&target.sheet_id, rows).await?;
        Ok(CommandOutcome::new(vec![
            OutputLine::Success(format!("Appended {count} rows to Google Sheets")),
            OutputLine::Info(target.client.spreadsheet_url(&target.sheet_id)),
        ]))
    }

    pub(super) async fn shell(&self, command_line: &str) -> Result<CommandOutcome, ShellError> {
        let output = match self.services.process_runner.run(command_line).await {
            Ok(output) => output,
            Err(e) => {
                return Ok(CommandOutcome::new(vec![OutputLine::Error(format!(
                    "Failed to run command: {e}"
                ))]));
            }
        };

        let mut lines: Vec<OutputLine> = output
            .stdout
            .lines()
            .map(|l| OutputLine::Body(l.to_string()))
            .collect();
        lines.extend(output.stderr.lines().map(|l| OutputLine::Warning(l.to_string())));
        match output.exit_code {
            Some(0) => {}
            Some(code) => lines.push(OutputLine::Warning(format!("Exit code: {code}"))),
            None => lines.push(OutputLine::Warning("Terminated by signal".to_string())),
        }
        Ok(CommandOutcome::new(lines))
    }

    pub(super) fn clear(&self) -> CommandOutcome {
        let mut lines = self.banner();
        lines.extend(self.help().lines);
        CommandOutcome::new(lines).with_status(CommandStatus::Clear)
    }

    pub(super) fn help(&self) -> CommandOutcome {
        let current = match self.session.current() {
            Some(doc) => OutputLine::Info(format!("Current file: {}", doc.file_name())),
            None => OutputLine::Info("No file open".to_string()),
        };

        let mut lines = vec![current, OutputLine::Heading("Available commands:".to_string())];
        lines.extend(
            builtin_commands()
                .iter()
                .map(|cmd| OutputLine::Body(format!("  {:<20} {}", cmd.usage, cmd.description))),
        );
        lines.push(OutputLine::Body(
            "  <file>.pdf           Open a PDF by typing its path".to_string(),
        ));
        CommandOutcome::new(lines)
    }

    pub(super) fn exit(&self) -> CommandOutcome {
        tracing::info!("[Shell] Exit requested");
        CommandOutcome::new(vec![OutputLine::Info("Goodbye!".to_string())])
            .with_status(CommandStatus::Exit)
    }

    fn write_archive(&self) -> Result<PathBuf, ShellError> {
        let record = ArchiveRecord::from_session(&self.session)?;
        Ok(ArchiveWriter::new(&self.working_dir).write(&record)?)
    }
}

fn document_summary(document: &Document) -> Vec<OutputLine> {
    let mut lines = vec![
        OutputLine::Success(format!("Opened: {}", document.file_name())),
        OutputLine::Info(format!("Pages: {}", document.page_count())),
    ];
    if let Some(title) = &document.metadata().title {
        lines.push(OutputLine::Info(format!("Title: {title}")));
    }
    if let Some(author) = &document.metadata().author {
        lines.push(OutputLine::Info(format!("Author: {author}")));
    }
    if document.has_text() {
        lines.push(OutputLine::Heading("Preview:".to_string()));
        lines.extend(body_lines(&document.preview(PREVIEW_CHARS)));
    } else {
        lines.push(OutputLine::Warning("No text could be extracted from this file".to_string()));
    }
    lines
}

fn comparison_lines(result: &ComparisonResult) -> Vec<OutputLine> {
    let name_a = result.doc_a.file_name();
    let name_b = result.doc_b.file_name();
    vec![
        OutputLine::Heading(format!("Comparison: {name_a} vs {name_b}")),
        OutputLine::Info(format!("Similarity: {:.1}%", result.similarity)),
        OutputLine::Body(format!("Common terms: {}", join_or_none(&result.similarities))),
        OutputLine::Body(format!(
            "Only in {name_a}: {}",
            join_or_none(&result.differences.only_in_a)
        )),
        OutputLine::Body(format!(
            "Only in {name_b}: {}",
            join_or_none(&result.differences.only_in_b)
        )),
    ]
}

/// `*.pdf` files directly under `dir` with their sizes, sorted by name.
fn pdf_files(dir: &Path) -> Vec<(String, u64)> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<(String, u64)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            let name = entry.file_name().into_string().ok()?;
            (metadata.is_file() && is_pdf_name(&name)).then_some((name, metadata.len()))
        })
        .collect();
    files.sort();
    files
}

fn body_lines(text: &str) -> impl Iterator<Item = OutputLine> + '_ {
    text.lines().map(|l| OutputLine::Body(l.to_string()))
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pdf_files_sorted_with_sizes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.pdf"), vec![0u8; 2048]).unwrap();
        std::fs::write(dir.path().join("a.PDF"), "x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(
            pdf_files(dir.path()),
            vec![("a.PDF".to_string(), 1), ("b.pdf".to_string(), 2048)]
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("summary"), "Summary");
        assert_eq!(capitalize(""), "");
    }
}
