//! Runs `shell <cmd>` lines through the platform shell.

use std::path::PathBuf;

use async_trait::async_trait;
use pdfsh_core::process::{ProcessOutput, ProcessRunner};
use tokio::process::Command;

/// `sh -c` on Unix, `cmd /C` on Windows.
#[derive(Debug, Clone, Default)]
pub struct SystemProcessRunner {
    working_dir: Option<PathBuf>,
}

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn command(&self, command_line: &str) -> Command {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command_line]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command_line]);
            c
        };

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        // Aborting the command future must not leave the child running.
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, command_line: &str) -> std::io::Result<ProcessOutput> {
        tracing::debug!("[ProcessRunner] Running: {}", command_line);
        let output = self.command(command_line).output().await?;

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let output = SystemProcessRunner::new().run("echo hello").await.unwrap();
        assert_eq!(output.stdout, "hello\n");
        assert!(output.success());
    }

    #[tokio::test]
    async fn test_failure_is_reported_not_raised() {
        let output = SystemProcessRunner::new()
            .run("echo oops >&2; exit 3")
            .await
            .unwrap();
        assert_eq!(output.stderr, "oops\n");
        assert_eq!(output.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_runs_in_working_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.pdf"), "x").unwrap();

        let output = SystemProcessRunner::new()
            .with_working_dir(dir.path())
            .run("ls")
            .await
            .unwrap();
        assert!(output.stdout.contains("marker.pdf"));
    }
}
