//! External process execution collaborator used by `shell <cmd>`.

use async_trait::async_trait;

/// Captured result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the child was terminated by a signal
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a command line through the platform shell.
///
/// A non-zero exit status is a normal [`ProcessOutput`]; only failing to start
/// the child is an error.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command_line: &str) -> std::io::Result<ProcessOutput>;
}
