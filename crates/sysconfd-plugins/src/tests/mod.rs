//! Shared in-memory executors used across the crate's unit tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::InvokeError;
use crate::invoker::CommandExecutor;
use crate::process::CommandOutput;

/// Echoes its input bytes back as standard output, like a plugin that
/// mirrors the request envelope.
pub(crate) struct EchoExecutor;

impl CommandExecutor for EchoExecutor {
    fn execute(&self, _executable: &Path, input: &[u8]) -> Result<CommandOutput, InvokeError> {
        Ok(CommandOutput::new(true, Some(0), input.to_vec()))
    }
}

/// Returns a fixed stdout payload regardless of input.
pub(crate) struct StaticExecutor(pub(crate) &'static [u8]);

impl CommandExecutor for StaticExecutor {
    fn execute(&self, _executable: &Path, _input: &[u8]) -> Result<CommandOutput, InvokeError> {
        Ok(CommandOutput::new(true, Some(0), self.0.to_vec()))
    }
}

/// Simulates a plugin that exits with a non-zero status.
pub(crate) struct NonZeroExitExecutor;

impl CommandExecutor for NonZeroExitExecutor {
    fn execute(&self, _executable: &Path, _input: &[u8]) -> Result<CommandOutput, InvokeError> {
        Ok(CommandOutput::new(false, Some(2), Vec::new()))
    }
}

/// Simulates an executable that cannot be started.
pub(crate) struct SpawnFailExecutor;

impl CommandExecutor for SpawnFailExecutor {
    fn execute(&self, executable: &Path, _input: &[u8]) -> Result<CommandOutput, InvokeError> {
        Err(InvokeError::Spawn {
            executable: executable.to_path_buf(),
            message: String::from("no such file or directory"),
            source: None,
        })
    }
}

/// Records the executable path and input bytes of every execution.
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    pub(crate) calls: Mutex<Vec<(PathBuf, Vec<u8>)>>,
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, executable: &Path, input: &[u8]) -> Result<CommandOutput, InvokeError> {
        self.calls
            .lock()
            .expect("recording lock")
            .push((executable.to_path_buf(), input.to_vec()));
        Ok(CommandOutput::new(true, Some(0), b"{}".to_vec()))
    }
}
