//! Command line handling: tokenizing, the built-in command table and completion.

pub mod builtin;
pub mod completion;
pub mod parser;

pub use builtin::{
    ArgumentSpec, BuiltinCommand, CommandName, builtin_commands, command_names,
    find_builtin_command,
};
pub use completion::{CompletionContext, CompletionIndex, CompletionRequest, is_pdf_name};
pub use parser::{ParsedCommand, parse, tokenize};
