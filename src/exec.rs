//! Builder for executing external tool processes.
//!
//! Unlike a plain `Command::status()` round trip, [`ToolCommand::run`] never
//! treats a non-zero exit status as an error: the status is handed back and
//! the caller decides what it means. Only failing to start the process is an
//! error here.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

use crate::error::{Error, Result};

/// Output of a completed tool invocation.
#[derive(Debug)]
pub struct RunOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8), present when requested via
    /// [`ToolCommand::capture_stdout`].
    pub stdout: Option<String>,
}

/// A builder for constructing and executing external tool invocations.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    capture_stdout: bool,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            capture_stdout: false,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Capture the process's standard output instead of inheriting it.
    pub fn capture_stdout(&mut self, capture: bool) -> &mut Self {
        self.capture_stdout = capture;
        self
    }

    /// Spawn the process and suspend until it exits.
    ///
    /// The wait is driven by the process-exit notification; there is no
    /// polling. If the caller's future is cancelled mid-wait, the child is
    /// killed on a best-effort basis.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tool`] if the process cannot be spawned or the wait
    /// itself fails. A non-zero exit status is *not* an error.
    pub async fn run(&self) -> Result<RunOutput> {
        let program_name = self
            .program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.kill_on_drop(true);

        if self.capture_stdout {
            cmd.stdout(Stdio::piped());
        }

        tracing::debug!("{} {}", program_name, self.args.join(" "));

        let child = cmd.spawn().map_err(|e| Error::Tool {
            tool: program_name.clone(),
            message: format!("failed to spawn: {e}"),
        })?;

        let output = child.wait_with_output().await.map_err(|e| Error::Tool {
            tool: program_name,
            message: format!("I/O error waiting for process: {e}"),
        })?;

        let stdout = self
            .capture_stdout
            .then(|| String::from_utf8_lossy(&output.stdout).to_string());

        Ok(RunOutput {
            status: output.status,
            stdout,
        })
    }
}
