//! Process execution utilities
//!
//! Runs the native toolchain with its output routed to the invocation's
//! logging sink.

use crate::{
    error::{FirError, Result},
    logging::LoggingState,
};
use std::{
    path::Path,
    process::{Command, Stdio},
};
use tracing::{debug, info, instrument};

/// Utility for running external processes
#[derive(Debug)]
pub struct ProcessRunner<'a> {
    debug: bool,
    logging: &'a LoggingState,
}

/// Result of a process execution
#[derive(Debug)]
pub struct ProcessResult {
    /// Exit status code
    pub exit_code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl<'a> ProcessRunner<'a> {
    /// Create a new process runner writing to `logging`'s sink
    #[must_use]
    pub const fn new(debug: bool, logging: &'a LoggingState) -> Self {
        Self { debug, logging }
    }

    /// Run a command with arguments in the current directory
    pub fn run_command(&self, command: &str, args: &[&str]) -> Result<()> {
        self.run_command_at(command, args, None)
    }

    /// Run a command with arguments in `dir`
    pub fn run_command_in(&self, dir: &Path, command: &str, args: &[&str]) -> Result<()> {
        self.run_command_at(command, args, Some(dir))
    }

    /// Run a command with arguments, optionally in another directory
    #[instrument(skip(self))]
    pub fn run_command_at(&self, command: &str, args: &[&str], dir: Option<&Path>) -> Result<()> {
        let cmd_str = format!("{} {}", command, args.join(" "));

        info!("+ {}", cmd_str);
        if self.debug {
            let dir = dir.map_or_else(|| ".".to_string(), |dir| dir.display().to_string());
            info!("  in {}", dir);
        }

        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdout(self.logging.child_stdio()?)
            .stderr(self.logging.child_stdio()?);

        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let status = cmd.status().map_err(|e| {
            FirError::process(cmd_str.clone(), None, format!("Failed to execute command: {e}"))
        })?;

        if !status.success() {
            let exit_code = status.code();
            return Err(FirError::process(
                cmd_str,
                exit_code,
                format!("Command failed with exit code: {exit_code:?}"),
            ));
        }

        debug!("Command completed successfully");
        Ok(())
    }

    /// Run a command and capture its output
    #[instrument(skip(self))]
    pub fn run_command_with_output(&self, command: &str, args: &[&str]) -> Result<ProcessResult> {
        let cmd_str = format!("{} {}", command, args.join(" "));
        debug!("Running command with output capture: {}", cmd_str);

        let output = Command::new(command)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                FirError::process(cmd_str.clone(), None, format!("Failed to execute command: {e}"))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code();

        debug!(
            "Command finished: success={}, exit_code={:?}, stdout_len={}, stderr_len={}",
            output.status.success(),
            exit_code,
            stdout.len(),
            stderr.len()
        );

        if self.debug {
            info!("  stdout: {}", stdout.trim_end());
            info!("  stderr: {}", stderr.trim_end());
        }

        if !output.status.success() {
            debug!("Command stderr: {}", stderr);
            return Err(FirError::process(cmd_str, exit_code, stderr));
        }

        Ok(ProcessResult {
            exit_code,
            stdout,
            stderr,
        })
    }
}
