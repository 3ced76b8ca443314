//! Styled output records produced by command handlers.
//!
//! The shell never prints; the front end decides how each kind is rendered.

/// One line of command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Heading(String),
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
    /// Unstyled text: analysis content, previews, child process output
    Body(String),
}

impl OutputLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Heading(s)
            | Self::Info(s)
            | Self::Success(s)
            | Self::Warning(s)
            | Self::Error(s)
            | Self::Body(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// What the front end should do after rendering a command's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandStatus {
    #[default]
    Continue,
    /// Clear the terminal before rendering
    Clear,
    Exit,
}

/// Result of executing one input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    pub lines: Vec<OutputLine>,
    pub status: CommandStatus,
}

impl CommandOutcome {
    pub fn new(lines: Vec<OutputLine>) -> Self {
        Self {
            lines,
            status: CommandStatus::Continue,
        }
    }

    pub fn with_status(mut self, status: CommandStatus) -> Self {
        self.status = status;
        self
    }

    pub fn has_error(&self) -> bool {
        self.lines.iter().any(OutputLine::is_error)
    }

    /// All output joined with newlines, styling dropped.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(OutputLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
