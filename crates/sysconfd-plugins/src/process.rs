//! Subprocess-backed command execution.
//!
//! [`ProcessExecutor`] implements the [`CommandExecutor`] trait by spawning
//! the plugin executable as a child process with no arguments, writing the
//! request bytes to its standard input on a dedicated writer thread, and
//! capturing standard output in full after the child exits. The writer
//! thread runs concurrently with output capture so a child that produces
//! output before draining its input cannot deadlock the daemon.
//!
//! No timeout or output-size bound is enforced; a hung plugin blocks its
//! handling task until the child exits.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::error::InvokeError;
use crate::invoker::CommandExecutor;

/// Tracing target for subprocess operations.
const PROCESS_TARGET: &str = "sysconfd_plugins::process";

/// Captured result of one executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    success: bool,
    exit_code: Option<i32>,
    stdout: Vec<u8>,
}

impl CommandOutput {
    /// Creates an output record, primarily for fakes in tests.
    #[must_use]
    pub const fn new(success: bool, exit_code: Option<i32>, stdout: Vec<u8>) -> Self {
        Self {
            success,
            exit_code,
            stdout,
        }
    }

    /// Returns whether the process exited successfully.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Returns the exit code, absent when the process died to a signal.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Returns the captured standard output.
    #[must_use]
    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    /// Consumes the record, yielding the captured standard output.
    #[must_use]
    pub fn into_stdout(self) -> Vec<u8> {
        self.stdout
    }
}

/// Executes commands by spawning real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    fn execute(&self, executable: &Path, input: &[u8]) -> Result<CommandOutput, InvokeError> {
        debug!(
            target: PROCESS_TARGET,
            executable = %executable.display(),
            input_bytes = input.len(),
            "spawning plugin process"
        );

        let mut child = Command::new(executable)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| InvokeError::Spawn {
                executable: executable.to_path_buf(),
                message: source.to_string(),
                source: Some(Arc::new(source)),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| InvokeError::Spawn {
            executable: executable.to_path_buf(),
            message: String::from("failed to capture stdin"),
            source: None,
        })?;

        // The writer runs concurrently with the wait below. Write errors are
        // deliberately discarded: stdin is closed either way, and a child
        // that ignores its input (broken pipe) is not an invocation failure.
        let payload = input.to_vec();
        let writer = thread::spawn(move || {
            let _ = stdin.write_all(&payload);
            let _ = stdin.flush();
            // stdin drops here, closing the pipe.
        });

        let output = child
            .wait_with_output()
            .map_err(|source| InvokeError::Io {
                executable: executable.to_path_buf(),
                source: Arc::new(source),
            });

        if writer.join().is_err() {
            warn!(
                target: PROCESS_TARGET,
                executable = %executable.display(),
                "stdin writer thread panicked"
            );
        }
        let output = output?;

        if !output.stderr.is_empty() {
            debug!(
                target: PROCESS_TARGET,
                executable = %executable.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "plugin stderr output"
            );
        }

        debug!(
            target: PROCESS_TARGET,
            executable = %executable.display(),
            status = ?output.status,
            stdout_bytes = output.stdout.len(),
            "plugin process exited"
        );

        Ok(CommandOutput::new(
            output.status.success(),
            output.status.code(),
            output.stdout,
        ))
    }
}
