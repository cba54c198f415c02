//! Domain errors raised by plugin dispatch operations.
//!
//! The error taxonomy follows the subsystem's propagation policy: registry
//! errors are startup-fatal, descriptor and mount-point errors degrade a
//! single plugin, and invocation errors are isolated to one request. I/O
//! errors are wrapped in `Arc` so the enums stay cheap to move.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while loading or validating the plugin registry.
///
/// Every variant is fatal to daemon startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Neither the primary registry path nor the configuration-directory
    /// fallback exists.
    #[error("plugin registry not found at '{primary}' or '{fallback}'")]
    NotFound {
        /// Primary path from the configuration.
        primary: PathBuf,
        /// Fallback path inside the configuration directory.
        fallback: PathBuf,
    },

    /// The registry file could not be read.
    #[error("failed to read plugin registry '{path}': {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The registry file is not valid JSON or does not match the schema.
    #[error("malformed plugin registry '{path}': {source}")]
    Malformed {
        /// Path of the malformed file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The registry declares a format version the daemon does not support.
    #[error("unsupported plugin registry format version {version} (expected 1)")]
    UnsupportedVersion {
        /// Version found in the file.
        version: u32,
    },

    /// A plugin record failed structural validation.
    #[error("invalid plugin record at index {index}: {message}")]
    InvalidRecord {
        /// Position of the record in the registry.
        index: usize,
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while loading a plugin's capability descriptor.
///
/// Descriptor failures skip the offending plugin's routes; they never abort
/// daemon startup.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The descriptor file named by the registry record is absent.
    #[error("descriptor for plugin '{plugin}' not found at '{path}'")]
    NotFound {
        /// Plugin name from the registry record.
        plugin: String,
        /// Path that was checked.
        path: PathBuf,
    },

    /// The descriptor file could not be read.
    #[error("failed to read descriptor for plugin '{plugin}': {source}")]
    Io {
        /// Plugin name from the registry record.
        plugin: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The descriptor is not valid JSON or does not match the schema.
    #[error("malformed descriptor for plugin '{plugin}' at '{path}': {source}")]
    Malformed {
        /// Plugin name from the registry record.
        plugin: String,
        /// Path of the malformed file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while validating a descriptor's API mount point.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MountPointError {
    /// The mount point is empty or does not start with `/`.
    #[error("invalid mount point '{value}': must be non-empty and start with '/'")]
    Invalid {
        /// The offending value.
        value: String,
    },

    /// The mount point is well-formed but outside the closed allow-list.
    #[error("mount point '{value}' is not permitted")]
    NotPermitted {
        /// The offending value.
        value: String,
    },
}

/// Errors raised while invoking a plugin executable.
///
/// Invocation errors are isolated per request. They are logged in full
/// server-side and surfaced to HTTP callers only as a generic failure body.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The plugin executable could not be started.
    #[error("failed to spawn plugin executable '{executable}': {message}")]
    Spawn {
        /// Path of the executable that failed to start.
        executable: PathBuf,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying I/O error.
        #[source]
        source: Option<Arc<std::io::Error>>,
    },

    /// An I/O error occurred while communicating with the child process.
    #[error("I/O error communicating with plugin executable '{executable}': {source}")]
    Io {
        /// Path of the executable being driven.
        executable: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The request envelope could not be serialised to JSON.
    #[error("failed to serialise plugin request envelope: {0}")]
    SerializeRequest(#[source] serde_json::Error),

    /// The plugin exited with a non-zero status.
    #[error("plugin '{plugin}' exited with non-zero status {code:?}")]
    Execution {
        /// Plugin name from the registry record.
        plugin: String,
        /// Exit code, when the process was not killed by a signal.
        code: Option<i32>,
    },

    /// The plugin's standard output is not valid JSON.
    #[error("plugin '{plugin}' produced invalid JSON output: {source}")]
    Decode {
        /// Plugin name from the registry record.
        plugin: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
