use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pdfsh_application::{CommandStatus, OutputLine, Shell, ShellServices, ShellState};
use pdfsh_core::analysis::{AnalysisBackend, AnalysisType};
use pdfsh_core::cloud::{CloudStorage, RemoteFile, SpreadsheetExport};
use pdfsh_core::document::{DocumentExtractor, ExtractedText};
use pdfsh_core::error::{BackendError, CloudError, ExtractionError};
use pdfsh_core::history::History;
use pdfsh_core::process::{ProcessOutput, ProcessRunner};
use pdfsh_core::session::Session;
use tempfile::TempDir;

/// Treats every file as plain text with one page.
struct PlainTextExtractor;

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<ExtractedText, ExtractionError> {
        let text = std::fs::read_to_string(path).map_err(|e| ExtractionError::Failed(e.to_string()))?;
        Ok(ExtractedText::new(text, 1))
    }
}

/// Echoes the input text and counts calls.
#[derive(Default)]
struct CountingBackend {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

#[async_trait]
impl AnalysisBackend for CountingBackend {
    fn name(&self) -> &str {
        "counting"
    }

    async fn analyze(&self, text: &str, _analysis_type: AnalysisType) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(text.to_string())
    }
}

struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    output: ProcessOutput,
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, command_line: &str) -> std::io::Result<ProcessOutput> {
        self.commands.lock().unwrap().push(command_line.to_string());
        Ok(self.output.clone())
    }
}

#[derive(Default)]
struct StubDrive {
    uploads: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl CloudStorage for StubDrive {
    async fn list_files(&self, _limit: usize) -> Result<Vec<RemoteFile>, CloudError> {
        Ok(vec![RemoteFile {
            id: "remote-1".to_string(),
            name: "remote.pdf".to_string(),
            size: Some(2048),
        }])
    }

    async fn download(&self, file_id: &str, dest_dir: &Path) -> Result<PathBuf, CloudError> {
        let path = dest_dir.join(format!("{file_id}.pdf"));
        std::fs::write(&path, "downloaded drive content").map_err(|e| CloudError::Io(e.to_string()))?;
        Ok(path)
    }

    async fn upload(&self, local_path: &Path) -> Result<String, CloudError> {
        self.uploads.lock().unwrap().push(local_path.to_path_buf());
        Ok("uploaded-1".to_string())
    }
}

#[derive(Default)]
struct StubSheets {
    rows: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl SpreadsheetExport for StubSheets {
    async fn append_rows(&self, _sheet_id: &str, rows: Vec<Vec<String>>) -> Result<(), CloudError> {
        self.rows.lock().unwrap().extend(rows);
        Ok(())
    }
}

struct Fixture {
    dir: TempDir,
    backend: Arc<CountingBackend>,
    runner: Arc<RecordingRunner>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_backend(CountingBackend::default())
    }

    fn with_backend(backend: CountingBackend) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("doc1.pdf"),
            "Rust ownership rules keep memory safe without garbage collection.",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("doc2.pdf"),
            "Gardening tips: water tomatoes early and rotate crops yearly.",
        )
        .unwrap();
        Self {
            dir,
            backend: Arc::new(backend),
            runner: Arc::new(RecordingRunner {
                commands: Mutex::new(Vec::new()),
                output: ProcessOutput::default(),
            }),
        }
    }

    fn services(&self) -> ShellServices {
        ShellServices::new(self.backend.clone(), self.runner.clone())
    }

    fn shell_with(&self, services: ShellServices) -> Shell {
        let session = Session::new(Arc::new(PlainTextExtractor), History::in_memory(100));
        Shell::new(session, services, self.dir.path())
    }

    fn shell(&self) -> Shell {
        self.shell_with(self.services())
    }

    fn calls(&self) -> usize {
        self.backend.calls.load(Ordering::SeqCst)
    }
}

fn current_name(shell: &Shell) -> Option<String> {
    shell.session().current().map(|d| d.file_name().into_owned())
}

#[tokio::test]
async fn test_open_analyze_open_compare_scenario() {
    let fx = Fixture::new();
    let mut shell = fx.shell();

    assert!(!shell.execute("open doc1.pdf").await.has_error());
    assert_eq!(current_name(&shell).as_deref(), Some("doc1.pdf"));

    let outcome = shell.execute("summary").await;
    assert!(!outcome.has_error(), "{}", outcome.plain_text());
    assert!(shell.session().last_result().is_some());

    shell.execute("open doc2.pdf").await;
    assert_eq!(current_name(&shell).as_deref(), Some("doc2.pdf"));
    assert!(shell.session().last_result().is_none());
    assert!(shell.session().stale_result().is_some());
    assert!(!shell.session().has_results());

    let outcome = shell.execute("compare doc1.pdf").await;
    assert!(!outcome.has_error(), "{}", outcome.plain_text());
    let comparison = shell.last_comparison().unwrap();
    assert_eq!(comparison.doc_a.file_name(), "doc1.pdf");
    assert_eq!(comparison.doc_b.file_name(), "doc2.pdf");
    assert_eq!(current_name(&shell).as_deref(), Some("doc2.pdf"));
    assert_eq!(fx.calls(), 3);

    let recorded: Vec<_> = shell
        .session()
        .history()
        .iter()
        .map(|e| e.command_text.clone())
        .collect();
    assert_eq!(
        recorded,
        vec!["open doc1.pdf", "summary", "open doc2.pdf", "compare doc1.pdf"]
    );
}

#[tokio::test]
async fn test_unknown_command_is_recorded_and_hints_help() {
    let fx = Fixture::new();
    let mut shell = fx.shell();

    let outcome = shell.execute("frobnicate now").await;
    assert!(outcome.has_error());
    assert!(outcome.plain_text().contains("Unknown command: frobnicate"));
    assert!(outcome.plain_text().contains("Type 'help'"));
    assert_eq!(
        shell.session().history().last().unwrap().command_text,
        "frobnicate now"
    );
    assert_eq!(shell.state(), ShellState::Idle);
}

#[tokio::test]
async fn test_unknown_analysis_type_makes_no_backend_call() {
    let fx = Fixture::new();
    let mut shell = fx.shell();
    shell.execute("open doc1.pdf").await;

    let outcome = shell.execute("analyze poetry").await;
    assert!(outcome.has_error());
    assert!(outcome.plain_text().contains("Unknown analysis type 'poetry'"));
    assert_eq!(fx.calls(), 0);
    assert!(!shell.session().has_results());
}

#[tokio::test]
async fn test_analyze_without_document_fails() {
    let fx = Fixture::new();
    let mut shell = fx.shell();

    let outcome = shell.execute("keywords").await;
    assert!(outcome.plain_text().contains("No PDF file open"));
    assert_eq!(fx.calls(), 0);
}

#[tokio::test]
async fn test_analyze_defaults_to_comprehensive() {
    let fx = Fixture::new();
    let mut shell = fx.shell();
    shell.execute("open doc1.pdf").await;

    shell.execute("analyze").await;
    let result = shell.session().last_result().unwrap();
    assert_eq!(result.analysis_type, AnalysisType::Comprehensive);
}

#[tokio::test]
async fn test_failed_open_keeps_current_document() {
    let fx = Fixture::new();
    let mut shell = fx.shell();
    shell.execute("open doc1.pdf").await;

    let outcome = shell.execute("open missing.pdf").await;
    assert!(outcome.plain_text().contains("File not found"));
    assert_eq!(current_name(&shell).as_deref(), Some("doc1.pdf"));
}

#[tokio::test]
async fn test_compare_same_file_is_rejected() {
    let fx = Fixture::new();
    let mut shell = fx.shell();
    shell.execute("open doc1.pdf").await;

    let outcome = shell.execute("compare doc1.pdf").await;
    assert!(outcome.has_error());
    assert!(shell.last_comparison().is_none());
    assert_eq!(fx.calls(), 0);
}

#[tokio::test]
async fn test_shell_command_non_zero_exit_is_reported() {
    let mut fx = Fixture::new();
    fx.runner = Arc::new(RecordingRunner {
        commands: Mutex::new(Vec::new()),
        output: ProcessOutput {
            stdout: "line one\nline two".to_string(),
            stderr: "boom".to_string(),
            exit_code: Some(3),
        },
    });
    let mut shell = fx.shell();

    let outcome = shell.execute("shell ls -la | grep 'x y'").await;
    assert_eq!(
        fx.runner.commands.lock().unwrap().as_slice(),
        ["ls -la | grep 'x y'"]
    );
    assert_eq!(
        outcome.lines,
        vec![
            OutputLine::Body("line one".to_string()),
            OutputLine::Body("line two".to_string()),
            OutputLine::Warning("boom".to_string()),
            OutputLine::Warning("Exit code: 3".to_string()),
        ]
    );
    assert_eq!(shell.state(), ShellState::Idle);
}

#[tokio::test]
async fn test_exit_and_end_of_input() {
    let fx = Fixture::new();

    let mut shell = fx.shell();
    let outcome = shell.execute("QUIT").await;
    assert_eq!(outcome.status, CommandStatus::Exit);
    assert!(shell.is_exited());

    let mut shell = fx.shell();
    shell.begin_reading();
    assert_eq!(shell.state(), ShellState::ReadingLine);
    shell.end_of_input();
    assert_eq!(shell.state(), ShellState::Exited);
}

#[tokio::test]
async fn test_blank_line_is_not_recorded() {
    let fx = Fixture::new();
    let mut shell = fx.shell();
    shell.begin_reading();

    let outcome = shell.execute("   ").await;
    assert!(outcome.lines.is_empty());
    assert!(shell.session().history().is_empty());
    assert_eq!(shell.state(), ShellState::Idle);
}

#[tokio::test]
async fn test_command_names_are_case_insensitive() {
    let fx = Fixture::new();
    let mut shell = fx.shell();

    assert!(!shell.execute("OPEN doc1.pdf").await.has_error());
    assert!(!shell.execute("Summary").await.has_error());
    assert_eq!(fx.calls(), 1);
}

#[tokio::test]
async fn test_bare_pdf_path_opens_file() {
    let fx = Fixture::new();
    let mut shell = fx.shell();

    assert!(!shell.execute("doc2.pdf").await.has_error());
    assert_eq!(current_name(&shell).as_deref(), Some("doc2.pdf"));

    let outcome = shell.execute("nothere.pdf").await;
    assert!(outcome.plain_text().contains("Unknown command"));
}

#[tokio::test]
async fn test_argument_count_errors() {
    let fx = Fixture::new();
    let mut shell = fx.shell();

    let outcome = shell.execute("open").await;
    assert!(outcome.plain_text().contains("Usage: open <file>"));

    let outcome = shell.execute("list extra").await;
    assert!(outcome.plain_text().contains("Too many arguments"));

    let outcome = shell.execute("shell").await;
    assert!(outcome.plain_text().contains("Usage: shell <cmd>"));
}

#[tokio::test]
async fn test_list_shows_pdf_files() {
    let fx = Fixture::new();
    let mut shell = fx.shell();

    let text = shell.execute("list").await.plain_text();
    assert!(text.contains("1. doc1.pdf"));
    assert!(text.contains("2. doc2.pdf"));
}

#[tokio::test]
async fn test_save_requires_results_then_writes_archive() {
    let fx = Fixture::new();
    let mut shell = fx.shell();
    shell.execute("open doc1.pdf").await;

    let outcome = shell.execute("save").await;
    assert!(outcome.plain_text().contains("No analysis results"));

    shell.execute("summary").await;
    shell.execute("keywords").await;
    let outcome = shell.execute("save").await;
    assert!(!outcome.has_error(), "{}", outcome.plain_text());

    let archives: Vec<_> = std::fs::read_dir(fx.dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("analysis_doc1_"))
        .collect();
    assert_eq!(archives.len(), 1);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(archives[0].path()).unwrap()).unwrap();
    assert!(json["analyses"]["summary"]["content"].is_string());
    assert!(json["analyses"]["keywords"]["content"].is_string());
}

#[tokio::test]
async fn test_cloud_commands_report_missing_configuration() {
    let fx = Fixture::new();
    let mut shell = fx.shell();

    assert!(shell.execute("google").await.plain_text().contains("Google Drive is not configured"));
    assert!(shell.execute("export").await.plain_text().contains("Google Drive is not configured"));
    assert!(shell.execute("sheets").await.plain_text().contains("Google Sheets is not configured"));
}

#[tokio::test]
async fn test_google_lists_and_downloads() {
    let fx = Fixture::new();
    let drive = Arc::new(StubDrive::default());
    let mut shell = fx.shell_with(fx.services().with_cloud_storage(drive.clone()));

    let text = shell.execute("google").await.plain_text();
    assert!(text.contains("remote.pdf (2.0 KB) [remote-1]"));

    let outcome = shell.execute("google remote-1").await;
    assert!(!outcome.has_error(), "{}", outcome.plain_text());
    assert_eq!(current_name(&shell).as_deref(), Some("remote-1.pdf"));
}

#[tokio::test]
async fn test_export_uploads_saved_archive() {
    let fx = Fixture::new();
    let drive = Arc::new(StubDrive::default());
    let mut shell = fx.shell_with(fx.services().with_cloud_storage(drive.clone()));
    shell.execute("open doc1.pdf").await;
    shell.execute("summary").await;

    let outcome = shell.execute("export").await;
    assert!(outcome.plain_text().contains("uploaded-1"));
    let uploads = drive.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].exists());
}

#[tokio::test]
async fn test_sheets_appends_one_row_per_result() {
    let fx = Fixture::new();
    let sheets = Arc::new(StubSheets::default());
    let mut shell = fx.shell_with(fx.services().with_spreadsheet(sheets.clone(), "sheet-1"));
    shell.execute("open doc1.pdf").await;

    assert!(shell.execute("sheets").await.plain_text().contains("No analysis results"));

    shell.execute("summary").await;
    shell.execute("entities").await;
    let outcome = shell.execute("sheets").await;
    assert!(outcome.plain_text().contains("Appended 2 rows"));
    assert!(outcome.plain_text().contains("docs.google.com/spreadsheets/d/sheet-1"));

    let rows = sheets.rows.lock().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "doc1.pdf");
    assert_eq!(rows[0][1], "summary");
    assert_eq!(rows[1][1], "entities");
}

#[tokio::test]
async fn test_interrupted_command_returns_to_idle() {
    let fx = Fixture::with_backend(CountingBackend {
        calls: AtomicUsize::new(0),
        delay: Some(Duration::from_secs(30)),
    });
    let mut shell = fx.shell();
    shell.execute("open doc1.pdf").await;

    let interrupted =
        tokio::time::timeout(Duration::from_millis(50), shell.execute("summary")).await;
    assert!(interrupted.is_err());
    assert_eq!(shell.state(), ShellState::Dispatching);

    shell.abort_dispatch();
    assert_eq!(shell.state(), ShellState::Idle);
    assert!(!shell.session().has_results());
    assert_eq!(shell.session().history().last().unwrap().command_text, "summary");
}

#[tokio::test]
async fn test_clear_and_help() {
    let fx = Fixture::new();
    let mut shell = fx.shell();

    let help = shell.execute("help").await.plain_text();
    assert!(help.contains("No file open"));
    assert!(help.contains("compare <file>"));

    let outcome = shell.execute("clear").await;
    assert_eq!(outcome.status, CommandStatus::Clear);
    assert!(outcome.plain_text().contains("pdfsh"));
}
