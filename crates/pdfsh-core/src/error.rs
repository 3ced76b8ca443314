//! Error types for the pdfsh shell.
//!
//! Each component owns a small, typed error enum. [`ShellError`] is the umbrella
//! that the shell loop catches and formats; it converts from every component error
//! via `From`, so handlers can use `?` throughout.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A malformed input line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line was empty or contained only whitespace.
    #[error("Empty input")]
    Empty,

    /// A quoted section was opened but never closed.
    #[error("Unterminated {quote} quote starting at column {column}")]
    UnterminatedQuote { quote: char, column: usize },
}

/// Failure of the document extraction collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The external extraction tool could not be started.
    #[error("{tool} is not available: {message}")]
    ToolUnavailable { tool: String, message: String },

    /// The tool ran but could not produce text.
    #[error("{0}")]
    Failed(String),
}

/// Failure to open a document into the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The path does not resolve to an existing file.
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The extraction collaborator could not produce text.
    #[error("Failed to extract text from {}: {source}", path.display())]
    ExtractionFailed {
        path: PathBuf,
        #[source]
        source: ExtractionError,
    },
}

impl DocumentError {
    /// Creates a NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure reported by an analysis backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Network or protocol level failure.
    #[error("Backend transport error: {0}")]
    Transport(String),

    /// Missing or rejected credentials.
    #[error("Backend authentication failed: {0}")]
    Auth(String),

    /// The provider refused the request because of rate limiting.
    #[error("Backend rate limit reached{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(delay) => format!(" (retry after {}s)", delay.as_secs()),
        None => String::new(),
    }
}

/// Failure of the analysis dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The analysis type token is not one of the supported types.
    #[error(
        "Unknown analysis type '{0}'. Choose from: summary, keywords, entities, technical, comprehensive"
    )]
    UnknownType(String),

    /// The backend signalled a transport or authentication failure.
    #[error("Analysis backend unavailable: {0}")]
    BackendUnavailable(#[source] BackendError),

    /// The backend is rate limiting requests.
    #[error("{0}")]
    RateLimited(#[source] BackendError),

    /// The document has no extracted text to analyze.
    #[error("Document contains no text to analyze")]
    EmptyDocument,
}

impl From<BackendError> for AnalysisError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::RateLimited { .. } => Self::RateLimited(err),
            BackendError::Transport(_) | BackendError::Auth(_) => Self::BackendUnavailable(err),
        }
    }
}

/// Failure of the comparison engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComparisonError {
    /// Both documents resolve to the same file.
    #[error("Cannot compare {} with itself", path.display())]
    IdenticalPath { path: PathBuf },

    /// One of the two analyses failed.
    #[error("Comparison failed: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Failure of the persistent history store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryStoreError {
    /// File system failure on the history file.
    #[error("History store I/O error at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// A line in the history file could not be encoded or decoded.
    #[error("History entry on line {line} is malformed: {message}")]
    Serialization { line: usize, message: String },
}

/// Failure of the Drive or Sheets collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloudError {
    /// Missing or rejected access token.
    #[error("Google authentication failed: {0}")]
    Auth(String),

    /// Network level failure.
    #[error("Google request failed: {0}")]
    Transport(String),

    /// The API answered with an error status.
    #[error("Google API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Local file handling failed.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Failure writing the results archive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("Failed to write {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("Failed to encode results: {0}")]
    Serialization(String),
}

/// Every error the shell loop can report for a single command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    History(#[from] HistoryStoreError),

    /// A command needs an open document and there is none.
    #[error("No PDF file open. Use 'open <file>' first")]
    NoDocumentOpen,

    /// A command needs stored analysis results and there are none.
    #[error("No analysis results for the current document")]
    NoResults,

    #[error("Missing argument. Usage: {usage}")]
    MissingArgument { usage: &'static str },

    #[error("Too many arguments. Usage: {usage}")]
    TooManyArguments { usage: &'static str },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// An optional collaborator has not been configured.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl ShellError {
    /// Check if this error came from an unknown command name
    pub fn is_unknown_command(&self) -> bool {
        matches!(self, Self::UnknownCommand(_))
    }
}

/// A type alias for `Result<T, ShellError>`.
pub type Result<T> = std::result::Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_maps_to_analysis_error() {
        let transport: AnalysisError = BackendError::Transport("timeout".into()).into();
        assert!(matches!(transport, AnalysisError::BackendUnavailable(_)));

        let auth: AnalysisError = BackendError::Auth("bad key".into()).into();
        assert!(matches!(auth, AnalysisError::BackendUnavailable(_)));

        let limited: AnalysisError = BackendError::RateLimited { retry_after: None }.into();
        assert!(matches!(limited, AnalysisError::RateLimited(_)));
    }

    #[test]
    fn test_rate_limit_message_includes_delay() {
        let err = BackendError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(err.to_string(), "Backend rate limit reached (retry after 30s)");
    }

    #[test]
    fn test_shell_error_is_transparent() {
        let err: ShellError = DocumentError::not_found("/tmp/missing.pdf").into();
        assert_eq!(err.to_string(), "File not found: /tmp/missing.pdf");
    }
}
