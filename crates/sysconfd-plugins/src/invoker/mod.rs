//! Plugin invocation orchestration.
//!
//! The [`PluginInvoker`] resolves the concrete executable for a registry
//! record, serialises the request envelope, runs the executable through a
//! [`CommandExecutor`], and decodes standard output into a
//! [`ResponseEnvelope`]. The executor abstraction lets tests drive the
//! invoker with in-memory fakes instead of real processes.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::InvokeError;
use crate::process::CommandOutput;
use crate::protocol::{RequestEnvelope, ResponseEnvelope};
use crate::registry::PluginRecord;

/// Tracing target for invocation operations.
const INVOKER_TARGET: &str = "sysconfd_plugins::invoker";

/// File extension of plugin executables.
const PLUGIN_EXTENSION: &str = "plugin";

/// System-wide plugin directory used when neither the record nor the
/// configuration declare one.
const SYSTEM_PLUGIN_DIR: &str = "/usr/lib/system-confd/plugins";

/// Abstracts command execution so the invoker can be tested without
/// spawning real processes.
///
/// The production implementation is
/// [`ProcessExecutor`](crate::process::ProcessExecutor).
///
/// # Examples
///
/// ```rust
/// use std::path::Path;
///
/// use sysconfd_plugins::{CommandExecutor, CommandOutput, InvokeError};
///
/// struct Echo;
///
/// impl CommandExecutor for Echo {
///     fn execute(&self, _executable: &Path, input: &[u8]) -> Result<CommandOutput, InvokeError> {
///         Ok(CommandOutput::new(true, Some(0), input.to_vec()))
///     }
/// }
///
/// # fn main() -> Result<(), InvokeError> {
/// let output = Echo.execute(Path::new("/plugins/keyboard/keyboard.plugin"), b"{}")?;
/// assert!(output.success());
/// assert_eq!(output.stdout(), b"{}");
/// # Ok(())
/// # }
/// ```
pub trait CommandExecutor: Send + Sync {
    /// Runs `executable` with `input` on its standard input, returning the
    /// captured exit status and standard output.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Spawn`] when the executable cannot be
    /// started and [`InvokeError::Io`] on communication failures.
    fn execute(&self, executable: &Path, input: &[u8]) -> Result<CommandOutput, InvokeError>;
}

/// Invokes plugin executables with JSON request envelopes.
#[derive(Debug)]
pub struct PluginInvoker<E> {
    executor: E,
    default_plugin_dir: PathBuf,
}

impl<E> PluginInvoker<E> {
    /// Creates an invoker with the given executor and configured default
    /// plugin directory.
    #[must_use]
    pub fn new(executor: E, default_plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            default_plugin_dir: default_plugin_dir.into(),
        }
    }

    /// Resolves the concrete executable for a record as
    /// `<plugin_dir>/<name>.plugin`.
    ///
    /// The plugin directory is the record's declared path, falling back to
    /// the configured default directory, then the hard-coded system
    /// default.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::path::PathBuf;
    ///
    /// use sysconfd_plugins::{PluginInvoker, PluginRecord, ProcessExecutor};
    ///
    /// let invoker = PluginInvoker::new(ProcessExecutor, "/usr/lib/system-confd/plugins");
    /// let record = PluginRecord::new(
    ///     "keyboard",
    ///     "/plugins/keyboard",
    ///     "/plugins/keyboard/meta.json",
    ///     true,
    /// );
    ///
    /// assert_eq!(
    ///     invoker.resolve_executable(&record),
    ///     PathBuf::from("/plugins/keyboard/keyboard.plugin"),
    /// );
    /// ```
    #[must_use]
    pub fn resolve_executable(&self, record: &PluginRecord) -> PathBuf {
        let dir = if !record.path().as_os_str().is_empty() {
            record.path()
        } else if !self.default_plugin_dir.as_os_str().is_empty() {
            self.default_plugin_dir.as_path()
        } else {
            Path::new(SYSTEM_PLUGIN_DIR)
        };
        dir.join(format!("{}.{PLUGIN_EXTENSION}", record.name()))
    }
}

impl<E: CommandExecutor> PluginInvoker<E> {
    /// Invokes the plugin named by `record` with `envelope`.
    ///
    /// Blocks until the child process exits and its output is fully read.
    /// There is no timeout or output cap: a hung plugin blocks the
    /// invoking task indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Spawn`] when the executable cannot be
    /// started, [`InvokeError::Execution`] when it exits non-zero, and
    /// [`InvokeError::Decode`] when standard output is not valid JSON.
    pub fn invoke(
        &self,
        record: &PluginRecord,
        envelope: &RequestEnvelope,
    ) -> Result<ResponseEnvelope, InvokeError> {
        let executable = self.resolve_executable(record);

        debug!(
            target: INVOKER_TARGET,
            plugin = record.name(),
            executable = %executable.display(),
            action = envelope.action(),
            "invoking plugin"
        );

        let input = serde_json::to_vec(envelope).map_err(InvokeError::SerializeRequest)?;
        let output = self.executor.execute(&executable, &input)?;

        if !output.success() {
            return Err(InvokeError::Execution {
                plugin: record.name().to_owned(),
                code: output.exit_code(),
            });
        }

        serde_json::from_slice(output.stdout()).map_err(|source| InvokeError::Decode {
            plugin: record.name().to_owned(),
            source,
        })
    }
}
