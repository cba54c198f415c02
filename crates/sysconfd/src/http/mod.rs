//! HTTP surface of the daemon.
//!
//! The router is assembled once at startup: built-in endpoints are nested
//! under `/api/v1`, and each enabled registry record contributes routes
//! under `/api/v1/system/plugins` according to its capability descriptor.
//! Plugins that fail descriptor loading or mount-point validation are
//! skipped individually; the rest of the surface stays up.

mod binder;
mod static_routes;
mod translate;

use std::sync::Arc;

use axum::Router;
use tracing::{debug, warn};

use sysconfd_config::Config;
use sysconfd_plugins::{
    CapabilityDescriptor, CommandExecutor, PluginInvoker, PluginRecord, PluginRegistry,
    load_descriptor, validate_mount_point,
};

use crate::health::HealthReporter;

pub use binder::{PluginSetupError, RoutePlan};

use binder::{bind_routes, plan_routes};
use static_routes::static_router;

const HTTP_TARGET: &str = "sysconfd::http";

/// Prefix for the built-in endpoints.
const API_PREFIX: &str = "/api/v1";

/// Prefix under which plugin-declared routes are mounted.
const PLUGIN_PREFIX: &str = "/api/v1/system/plugins";

/// Builds the daemon router from the validated registry.
///
/// Returns the router together with the table of plugin routes that were
/// actually bound.
pub fn build_router<E>(
    config: &Config,
    registry: &PluginRegistry,
    executor: E,
    reporter: &dyn HealthReporter,
) -> (Router, Vec<RoutePlan>)
where
    E: CommandExecutor + 'static,
{
    let invoker = Arc::new(PluginInvoker::new(
        executor,
        config.plugin_dir().as_std_path(),
    ));

    let mut plugin_router = Router::new();
    let mut table: Vec<RoutePlan> = Vec::new();

    for record in registry.plugins() {
        if !record.enabled() {
            debug!(
                target: HTTP_TARGET,
                plugin = record.name(),
                "skipping disabled plugin"
            );
            continue;
        }

        let record = Arc::new(record.clone());
        match prepare_plugin(&record) {
            Ok(descriptor) => {
                audit_executable(&invoker, &record);
                let plans = plan_routes(record.name(), &descriptor);
                // A path collision would otherwise panic inside
                // `Router::route`; skip the later plugin instead.
                if let Some(collision) = plans
                    .iter()
                    .find(|plan| table.iter().any(|bound| bound.path() == plan.path()))
                {
                    let error = PluginSetupError::RouteCollision {
                        path: collision.path().to_owned(),
                    };
                    reporter.plugin_skipped(record.name(), &error);
                    continue;
                }
                plugin_router = bind_routes(plugin_router, &invoker, &record, &plans);
                reporter.plugin_routes_bound(record.name(), plans.len());
                table.extend(plans);
            }
            Err(error) => reporter.plugin_skipped(record.name(), &error),
        }
    }

    let mut router = Router::new().nest(API_PREFIX, static_router());
    if !table.is_empty() {
        router = router.nest(PLUGIN_PREFIX, plugin_router);
    }
    (router, table)
}

/// Loads and validates the descriptor for an enabled record.
fn prepare_plugin(record: &PluginRecord) -> Result<CapabilityDescriptor, PluginSetupError> {
    let descriptor = load_descriptor(record)?;
    validate_mount_point(descriptor.api_mount_point())?;
    Ok(descriptor)
}

/// Outcome of the startup stat-check for one plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExecutableAudit {
    directory_present: bool,
    executable_present: bool,
}

/// Stat-checks a plugin's resolved directory and executable, warning on
/// whatever is absent.
///
/// Absence is not fatal: the registry may legitimately describe a plugin
/// installed later, and invocation failures surface per request anyway.
fn audit_executable<E>(invoker: &PluginInvoker<E>, record: &PluginRecord) -> ExecutableAudit {
    let executable = invoker.resolve_executable(record);
    let directory = executable.parent();
    let directory_present = directory.is_some_and(std::path::Path::is_dir);
    let executable_present = executable.exists();

    if !directory_present
        && let Some(directory) = directory
    {
        warn!(
            target: HTTP_TARGET,
            plugin = record.name(),
            directory = %directory.display(),
            "plugin directory not found at startup"
        );
    }
    if !executable_present {
        warn!(
            target: HTTP_TARGET,
            plugin = record.name(),
            executable = %executable.display(),
            "plugin executable not found at startup"
        );
    }

    ExecutableAudit {
        directory_present,
        executable_present,
    }
}

#[cfg(test)]
mod tests;
