//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;

use crate::bootstrap::BootstrapError;
use crate::http::PluginSetupError;

use sysconfd_config::Config;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked after a plugin's routes have been bound.
    fn plugin_routes_bound(&self, plugin: &str, routes: usize);

    /// Invoked when a plugin is skipped rather than bound.
    fn plugin_skipped(&self, plugin: &str, error: &PluginSetupError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn plugin_routes_bound(&self, plugin: &str, routes: usize) {
        (**self).plugin_routes_bound(plugin, routes);
    }

    fn plugin_skipped(&self, plugin: &str, error: &PluginSetupError) {
        (**self).plugin_skipped(plugin, error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "sysconfd::health",
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "sysconfd::health",
            event = "bootstrap_succeeded",
            socket = %config.socket_path(),
            registry = %config.plugin_registry_file(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "sysconfd::health",
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn plugin_routes_bound(&self, plugin: &str, routes: usize) {
        tracing::info!(
            target: "sysconfd::health",
            event = "plugin_routes_bound",
            plugin = %plugin,
            routes,
            "plugin routes bound"
        );
    }

    fn plugin_skipped(&self, plugin: &str, error: &PluginSetupError) {
        tracing::warn!(
            target: "sysconfd::health",
            event = "plugin_skipped",
            plugin = %plugin,
            error = %error,
            "plugin skipped during route binding"
        );
    }
}
