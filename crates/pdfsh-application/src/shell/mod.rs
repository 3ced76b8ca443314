//! The shell loop's state machine and command routing.
//!
//! A front end drives a [`Shell`] by calling [`Shell::begin_reading`] before it
//! prompts, [`Shell::execute`] with every line it reads and
//! [`Shell::end_of_input`] when input closes. The shell processes one line to
//! completion at a time and never lets a command error escape.

mod handlers;

use std::path::{Path, PathBuf};

use pdfsh_core::analysis::AnalysisType;
use pdfsh_core::command::{ArgumentSpec, CommandName, ParsedCommand, find_builtin_command, parse};
use pdfsh_core::comparison::ComparisonResult;
use pdfsh_core::error::ShellError;
use pdfsh_core::history::HistoryEntry;
use pdfsh_core::session::Session;

use crate::output::{CommandOutcome, CommandStatus, OutputLine};
use crate::services::ShellServices;

/// Lifecycle of the shell loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Idle,
    ReadingLine,
    Dispatching,
    /// Terminal
    Exited,
}

pub struct Shell {
    session: Session,
    services: ShellServices,
    working_dir: PathBuf,
    state: ShellState,
    last_comparison: Option<ComparisonResult>,
}

impl Shell {
    /// Creates an idle shell resolving relative paths against `working_dir`.
    pub fn new(session: Session, services: ShellServices, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            session,
            services,
            working_dir: working_dir.into(),
            state: ShellState::Idle,
            last_comparison: None,
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn is_exited(&self) -> bool {
        self.state == ShellState::Exited
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn backend_name(&self) -> &str {
        self.services.backend_name()
    }

    pub fn last_comparison(&self) -> Option<&ComparisonResult> {
        self.last_comparison.as_ref()
    }

    /// `Idle -> ReadingLine`.
    pub fn begin_reading(&mut self) {
        if self.state == ShellState::Idle {
            self.state = ShellState::ReadingLine;
        }
    }

    /// End of input: `ReadingLine -> Exited`.
    pub fn end_of_input(&mut self) {
        tracing::info!("[Shell] End of input");
        self.state = ShellState::Exited;
    }

    /// Returns an interrupted dispatch to `Idle`.
    ///
    /// Called after the future returned by [`Shell::execute`] was dropped
    /// before completing. Session updates are applied only when a command
    /// finishes, so nothing needs rolling back.
    pub fn abort_dispatch(&mut self) {
        if self.state == ShellState::Dispatching {
            tracing::info!("[Shell] Command interrupted");
            self.state = ShellState::Idle;
        }
    }

    /// Executes one input line.
    ///
    /// Blank lines are ignored. Every other line is recorded in the history
    /// before it is dispatched, whether or not the command succeeds.
    pub async fn execute(&mut self, line: &str) -> CommandOutcome {
        if self.is_exited() {
            return CommandOutcome::default().with_status(CommandStatus::Exit);
        }
        if line.trim().is_empty() {
            self.state = ShellState::Idle;
            return CommandOutcome::default();
        }

        self.state = ShellState::Dispatching;
        let mut lines = Vec::new();
        if let Err(err) = self.session.append_history(HistoryEntry::now(line.trim())) {
            tracing::warn!("[Shell] Failed to persist history: {}", err);
            lines.push(OutputLine::Warning(format!("History not saved: {err}")));
        }

        let mut outcome = match self.dispatch(line).await {
            Ok(outcome) => outcome,
            Err(err) => error_outcome(err),
        };
        lines.append(&mut outcome.lines);
        outcome.lines = lines;

        self.state = match outcome.status {
            CommandStatus::Exit => ShellState::Exited,
            _ => ShellState::Idle,
        };
        outcome
    }

    async fn dispatch(&mut self, line: &str) -> Result<CommandOutcome, ShellError> {
        let parsed = parse(line)?;

        let Some(name) = CommandName::lookup(&parsed.name) else {
            if let Some(path) = self.bare_pdf_path(&parsed) {
                return self.open(&path).await;
            }
            return Err(ShellError::UnknownCommand(parsed.name));
        };

        check_arguments(name, &parsed)?;
        tracing::debug!("[Shell] Dispatching {}", name);

        match name {
            CommandName::Open => self.open(&parsed.args[0]).await,
            CommandName::List => self.list(),
            CommandName::Analyze => {
                let default_type: &str = AnalysisType::default().into();
                self.analyze(parsed.arg(0).unwrap_or(default_type)).await
            }
            CommandName::Summary
            | CommandName::Keywords
            | CommandName::Entities
            | CommandName::Technical
            | CommandName::Comprehensive => {
                let analysis_type = name.analysis_shortcut().unwrap_or_default();
                self.analyze(analysis_type.as_ref()).await
            }
            CommandName::Compare => self.compare(&parsed.args[0]).await,
            CommandName::Save => self.save(),
            CommandName::Export => self.export().await,
            CommandName::Google => self.google(parsed.arg(0)).await,
            CommandName::Sheets => self.sheets().await,
            CommandName::Shell => self.shell(&parsed.rest).await,
            CommandName::Clear => Ok(self.clear()),
            CommandName::Help => Ok(self.help()),
            CommandName::Exit => Ok(self.exit()),
        }
    }

    /// A lone word naming an existing `.pdf` file.
    fn bare_pdf_path(&self, parsed: &ParsedCommand) -> Option<PathBuf> {
        if !parsed.args.is_empty() || !pdfsh_core::command::is_pdf_name(&parsed.name) {
            return None;
        }
        let path = self.resolve(&parsed.name);
        path.is_file().then_some(path)
    }

    fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.working_dir.join(path)
    }
}

fn check_arguments(name: CommandName, parsed: &ParsedCommand) -> Result<(), ShellError> {
    let command = find_builtin_command(name);
    let usage = command.usage;
    match (command.argument, parsed.args.len()) {
        (ArgumentSpec::NoArgument, 0) => Ok(()),
        (ArgumentSpec::NoArgument, _) => Err(ShellError::TooManyArguments { usage }),
        (ArgumentSpec::Required, 0) => Err(ShellError::MissingArgument { usage }),
        (ArgumentSpec::Required | ArgumentSpec::Optional, 0 | 1) => Ok(()),
        (ArgumentSpec::Required | ArgumentSpec::Optional, _) => {
            Err(ShellError::TooManyArguments { usage })
        }
        (ArgumentSpec::RawRest, _) if parsed.rest.is_empty() => {
            Err(ShellError::MissingArgument { usage })
        }
        (ArgumentSpec::RawRest, _) => Ok(()),
    }
}

fn error_outcome(err: ShellError) -> CommandOutcome {
    tracing::debug!("[Shell] Command failed: {}", err);
    let mut lines = vec![OutputLine::Error(err.to_string())];
    if err.is_unknown_command() {
        lines.push(OutputLine::Info(
            "Type 'help' for available commands".to_string(),
        ));
    }
    CommandOutcome::new(lines)
}
