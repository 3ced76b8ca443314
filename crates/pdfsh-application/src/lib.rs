//! Application layer for pdfsh.
//!
//! Wires the core session and command table to the collaborators behind
//! [`ShellServices`] and turns every input line into a [`CommandOutcome`].

pub mod output;
pub mod services;
pub mod shell;

pub use output::{CommandOutcome, CommandStatus, OutputLine};
pub use services::ShellServices;
pub use shell::{Shell, ShellState};
