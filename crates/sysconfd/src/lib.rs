//! The `system-confd` daemon.
//!
//! `sysconfd` exposes a small HTTP API over a Unix domain socket and
//! delegates domain-specific configuration work to out-of-process plugin
//! executables managed by [`sysconfd_plugins`]. The daemon bootstraps by
//! loading configuration, initialising structured telemetry, loading and
//! validating the plugin registry, and binding one HTTP route per
//! descriptor-declared path before serving requests.
//!
//! Plugin failures degrade gracefully: a plugin whose descriptor fails to
//! load or whose mount point is not permitted contributes no routes, while
//! the rest of the daemon keeps serving. Request-time plugin failures are
//! logged in full server-side and surfaced to callers only as a generic
//! error body.

mod bootstrap;
mod health;
mod http;
mod server;
mod telemetry;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use thiserror::Error;

pub use bootstrap::{BootstrapError, ConfigLoader, Daemon, SystemConfigLoader, bootstrap_with};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use http::{PluginSetupError, RoutePlan, build_router};
pub use server::{ServeError, serve};
pub use telemetry::{TelemetryError, TelemetryHandle};

use sysconfd_plugins::ProcessExecutor;

/// Errors surfaced by the daemon entry point.
#[derive(Debug, Error)]
pub enum RunError {
    /// The daemon was started without root privileges.
    #[error("this daemon must be run as root")]
    NotRoot,
    /// Bootstrap failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// Serving failed.
    #[error(transparent)]
    Serve(#[from] ServeError),
}

/// Runs the daemon to completion: bootstrap, serve, graceful shutdown.
///
/// # Errors
///
/// Returns [`RunError`] when the process lacks root privileges, bootstrap
/// fails, or the socket cannot be served.
pub async fn run() -> Result<(), RunError> {
    if !nix::unistd::Uid::effective().is_root() {
        return Err(RunError::NotRoot);
    }

    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    let daemon = bootstrap_with(&SystemConfigLoader, reporter, ProcessExecutor)?;
    let router = daemon.router();
    serve(daemon.config(), router).await?;
    Ok(())
}
