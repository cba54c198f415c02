//! Shared fakes for daemon tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sysconfd_config::Config;
use sysconfd_plugins::{CommandExecutor, CommandOutput, InvokeError};

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::http::PluginSetupError;

/// Echoes the request envelope back as the plugin response, recording
/// every invocation.
#[derive(Clone, Default)]
pub(crate) struct EchoExecutor {
    calls: Arc<Mutex<Vec<(PathBuf, Vec<u8>)>>>,
}

impl EchoExecutor {
    pub(crate) fn calls(&self) -> Vec<(PathBuf, Vec<u8>)> {
        self.calls.lock().expect("executor call log lock").clone()
    }
}

impl CommandExecutor for EchoExecutor {
    fn execute(&self, executable: &Path, input: &[u8]) -> Result<CommandOutput, InvokeError> {
        self.calls
            .lock()
            .expect("executor call log lock")
            .push((executable.to_path_buf(), input.to_vec()));
        Ok(CommandOutput::new(true, Some(0), input.to_vec()))
    }
}

/// Simulates a plugin exiting non-zero.
pub(crate) struct FailingExecutor;

impl CommandExecutor for FailingExecutor {
    fn execute(&self, _executable: &Path, _input: &[u8]) -> Result<CommandOutput, InvokeError> {
        Ok(CommandOutput::new(false, Some(3), Vec::new()))
    }
}

/// Simulates a plugin writing non-JSON output.
pub(crate) struct GarbageExecutor;

impl CommandExecutor for GarbageExecutor {
    fn execute(&self, _executable: &Path, _input: &[u8]) -> Result<CommandOutput, InvokeError> {
        Ok(CommandOutput::new(true, Some(0), b"not json".to_vec()))
    }
}

/// Reporter that records lifecycle events for assertions.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<String>>,
    bound: Mutex<Vec<(String, usize)>>,
    skipped: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().expect("reporter lock").clone()
    }

    pub(crate) fn bound(&self) -> Vec<(String, usize)> {
        self.bound.lock().expect("reporter lock").clone()
    }

    pub(crate) fn skipped(&self) -> Vec<String> {
        self.skipped.lock().expect("reporter lock").clone()
    }

    fn record(&self, event: impl Into<String>) {
        self.events.lock().expect("reporter lock").push(event.into());
    }
}

impl HealthReporter for RecordingReporter {
    fn bootstrap_starting(&self) {
        self.record("bootstrap_starting");
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record("bootstrap_succeeded");
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(format!("bootstrap_failed: {error}"));
    }

    fn plugin_routes_bound(&self, plugin: &str, routes: usize) {
        self.bound
            .lock()
            .expect("reporter lock")
            .push((plugin.to_owned(), routes));
    }

    fn plugin_skipped(&self, plugin: &str, _error: &PluginSetupError) {
        self.skipped
            .lock()
            .expect("reporter lock")
            .push(plugin.to_owned());
    }
}
