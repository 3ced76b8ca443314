//! The static command table.
//!
//! Every command the shell understands is a [`CommandName`] variant; the shell
//! loop matches on it exhaustively, so adding a command without a handler does
//! not compile.

use std::sync::OnceLock;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::analysis::AnalysisType;

/// Names of the built-in commands.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CommandName {
    Open,
    List,
    Save,
    Export,
    Analyze,
    Summary,
    Keywords,
    Entities,
    Technical,
    Comprehensive,
    Compare,
    Google,
    Sheets,
    Shell,
    Clear,
    Help,
    #[strum(to_string = "exit", serialize = "quit")]
    Exit,
}

impl CommandName {
    /// Resolves a typed command word, case-insensitively.
    pub fn lookup(word: &str) -> Option<Self> {
        word.parse().ok()
    }

    /// The analysis type run by the shortcut commands (`summary`, `keywords`, ...).
    pub fn analysis_shortcut(self) -> Option<AnalysisType> {
        match self {
            Self::Summary => Some(AnalysisType::Summary),
            Self::Keywords => Some(AnalysisType::Keywords),
            Self::Entities => Some(AnalysisType::Entities),
            Self::Technical => Some(AnalysisType::Technical),
            Self::Comprehensive => Some(AnalysisType::Comprehensive),
            _ => None,
        }
    }
}

/// What a command accepts after its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentSpec {
    NoArgument,
    Optional,
    Required,
    /// The raw remainder of the line, quotes preserved
    RawRest,
}

/// A built-in command and its help text.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltinCommand {
    pub name: CommandName,
    /// Usage format (e.g., "open <file>")
    pub usage: &'static str,
    /// Human-readable description
    pub description: &'static str,
    pub argument: ArgumentSpec,
}

impl BuiltinCommand {
    pub const fn new(
        name: CommandName,
        usage: &'static str,
        description: &'static str,
        argument: ArgumentSpec,
    ) -> Self {
        Self {
            name,
            usage,
            description,
            argument,
        }
    }

    /// Whether the command's argument is a file path.
    pub fn takes_path(&self) -> bool {
        matches!(self.name, CommandName::Open | CommandName::Compare)
    }
}

static BUILTIN_COMMANDS: OnceLock<Vec<BuiltinCommand>> = OnceLock::new();

/// Returns all built-in commands in help order.
pub fn builtin_commands() -> &'static [BuiltinCommand] {
    BUILTIN_COMMANDS.get_or_init(|| {
        use ArgumentSpec::*;
        use CommandName::*;

        vec![
            BuiltinCommand::new(Open, "open <file>", "Open a PDF file", Required),
            BuiltinCommand::new(List, "list", "List PDF files in current directory", NoArgument),
            BuiltinCommand::new(
                Analyze,
                "analyze <type>",
                "Analyze current PDF (summary/keywords/entities/technical/comprehensive)",
                Optional,
            ),
            BuiltinCommand::new(Summary, "summary", "Summarize the current PDF", NoArgument),
            BuiltinCommand::new(Keywords, "keywords", "Extract keywords from the current PDF", NoArgument),
            BuiltinCommand::new(Entities, "entities", "List named entities in the current PDF", NoArgument),
            BuiltinCommand::new(Technical, "technical", "Technical analysis of the current PDF", NoArgument),
            BuiltinCommand::new(
                Comprehensive,
                "comprehensive",
                "Comprehensive analysis of the current PDF",
                NoArgument,
            ),
            BuiltinCommand::new(Compare, "compare <file>", "Compare another PDF with the current one", Required),
            BuiltinCommand::new(Save, "save", "Save analysis results to a JSON file", NoArgument),
            BuiltinCommand::new(Export, "export", "Save analysis results and upload them to Google Drive", NoArgument),
            BuiltinCommand::new(
                Google,
                "google [file-id]",
                "List PDFs on Google Drive, or download and open one",
                Optional,
            ),
            BuiltinCommand::new(Sheets, "sheets", "Append analysis results to Google Sheets", NoArgument),
            BuiltinCommand::new(Shell, "shell <cmd>", "Run a shell command", RawRest),
            BuiltinCommand::new(Clear, "clear", "Clear screen", NoArgument),
            BuiltinCommand::new(Help, "help", "Show this help", NoArgument),
            BuiltinCommand::new(Exit, "exit", "Exit application", NoArgument),
        ]
    })
}

/// Finds the table entry for a command.
pub fn find_builtin_command(name: CommandName) -> &'static BuiltinCommand {
    builtin_commands()
        .iter()
        .find(|cmd| cmd.name == name)
        .unwrap_or_else(|| unreachable!("every CommandName has a table entry"))
}

/// Command names in ascending order.
pub fn command_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CommandName::iter().map(<&'static str>::from).collect();
    names.sort_unstable();
    names
}
