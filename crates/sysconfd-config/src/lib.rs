//! Runtime configuration shared by the `system-confd` daemon.
//!
//! Configuration is resolved once at startup by layering defaults, an
//! optional configuration file, environment variables prefixed with
//! `SYSCONFD_`, and command-line flags, in that order of precedence. The
//! resulting [`Config`] is immutable and passed by reference into the
//! components that need it; no component reads ambient process-wide state.

mod defaults;
mod logging;
mod socket;

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketPreparationError, prepare_socket_filesystem};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_PLUGIN_DIR, DEFAULT_SOCKET_PATH, config_directory,
};

/// Resolved daemon configuration.
///
/// Field defaults mirror the paths the daemon has always used:
/// `/var/run/system-confd/system-confd.sock` for the socket,
/// `/usr/lib/system-confd/plugins` for the plugin directory, and
/// `/etc/system-confd` (or a `config/` directory beside the executable)
/// for the configuration directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SYSCONFD")]
pub struct Config {
    /// Filesystem path for the daemon's Unix domain socket.
    #[serde(default = "defaults::default_socket_path")]
    pub socket_path: Utf8PathBuf,
    /// Tracing filter expression, e.g. `info` or `sysconfd=debug`.
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Output format for structured logs.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Directory searched for plugin executables when a record declares no
    /// path of its own.
    #[serde(default = "defaults::default_plugin_dir")]
    pub plugin_dir: Utf8PathBuf,
    /// Primary path of the plugin registry file.
    #[serde(default = "defaults::default_registry_file")]
    pub plugin_registry_file: Utf8PathBuf,
    /// Directory holding the daemon's configuration files; also the
    /// fallback location for the plugin registry.
    #[serde(default = "defaults::config_directory")]
    pub config_dir: Utf8PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: defaults::default_socket_path(),
            log_filter: defaults::default_log_filter_string(),
            log_format: LogFormat::default(),
            plugin_dir: defaults::default_plugin_dir(),
            plugin_registry_file: defaults::default_registry_file(),
            config_dir: defaults::config_directory(),
        }
    }
}

impl Config {
    /// Loads configuration from defaults, file, environment, and CLI args.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`OrthoError`] when any layer fails to parse.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Path of the daemon's Unix domain socket.
    #[must_use]
    pub fn socket_path(&self) -> &Utf8Path {
        self.socket_path.as_path()
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Configured log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Fallback directory for plugin executables.
    #[must_use]
    pub fn plugin_dir(&self) -> &Utf8Path {
        self.plugin_dir.as_path()
    }

    /// Primary plugin registry file path.
    #[must_use]
    pub fn plugin_registry_file(&self) -> &Utf8Path {
        self.plugin_registry_file.as_path()
    }

    /// Configuration directory.
    #[must_use]
    pub fn config_dir(&self) -> &Utf8Path {
        self.config_dir.as_path()
    }

    /// Ensures the socket's parent directory exists before binding.
    ///
    /// # Errors
    ///
    /// Returns [`SocketPreparationError`] when the directory cannot be
    /// created.
    pub fn prepare_socket_filesystem(&self) -> Result<(), SocketPreparationError> {
        socket::prepare_socket_filesystem(self.socket_path())
    }
}
