//! Plugin dispatch library for the `system-confd` daemon.
//!
//! The `sysconfd-plugins` crate implements the dispatch subsystem that lets
//! the daemon delegate domain-specific work (hardware, network, security,
//! services, software) to out-of-process plugin executables. Plugins are
//! opaque, short-lived child processes that receive a single JSON request
//! envelope on standard input and answer with a single JSON document on
//! standard output.
//!
//! # Architecture
//!
//! At startup the daemon loads the [`PluginRegistry`] (the top-level file
//! listing known plugins), validates its records, and for each enabled
//! record loads a [`CapabilityDescriptor`] declaring the plugin's API mount
//! point and route table. Mount points are checked against a closed
//! allow-list so plugins cannot introduce arbitrary top-level namespaces.
//! At request time a bound route builds a [`RequestEnvelope`] and hands it
//! to the [`PluginInvoker`], which resolves the plugin executable and runs
//! it through a [`CommandExecutor`].
//!
//! The [`CommandExecutor`] trait is the subprocess seam: the production
//! [`ProcessExecutor`] spawns real child processes, while tests substitute
//! in-memory fakes that never fork.

pub mod descriptor;
pub mod error;
pub mod invoker;
pub mod mount;
pub mod process;
pub mod protocol;
pub mod registry;

#[cfg(test)]
mod tests;

pub use self::descriptor::{CapabilityDescriptor, PathSpec, RouteMethod, load_descriptor};
pub use self::error::{DescriptorError, InvokeError, MountPointError, RegistryError};
pub use self::invoker::{CommandExecutor, PluginInvoker};
pub use self::mount::{ALLOWED_MOUNT_POINTS, validate_mount_point};
pub use self::process::{CommandOutput, ProcessExecutor};
pub use self::protocol::{PROTOCOL_VERSION, RequestEnvelope, ResponseEnvelope, action_for_suffix};
pub use self::registry::{PluginRecord, PluginRegistry, load_registry};
