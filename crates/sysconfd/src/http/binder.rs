//! Route planning and binding for plugin-declared API paths.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error};

use sysconfd_plugins::{
    CapabilityDescriptor, CommandExecutor, DescriptorError, MountPointError, PluginInvoker,
    PluginRecord, RequestEnvelope, RouteMethod, action_for_suffix,
};

use super::translate::{internal_error_body, translate};

const BINDER_TARGET: &str = "sysconfd::http";

/// Reasons a plugin contributes no routes.
///
/// These are per-plugin degradations, never startup failures: the binder
/// reports them and moves on to the next record.
#[derive(Debug, Error)]
pub enum PluginSetupError {
    /// The capability descriptor could not be loaded.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    /// The descriptor declared a mount point outside the allow-list.
    #[error(transparent)]
    MountPoint(#[from] MountPointError),
    /// The descriptor declared a route path another plugin already bound.
    #[error("route '{path}' is already bound by another plugin")]
    RouteCollision {
        /// The colliding route path.
        path: String,
    },
}

/// One planned route, recorded before any handler is constructed.
///
/// The plan table survives binding so startup logging and tests can
/// inspect exactly what was mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    plugin: String,
    method: RouteMethod,
    path: String,
    action: String,
}

impl RoutePlan {
    /// Name of the plugin the route belongs to.
    #[must_use]
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// HTTP method the route answers.
    #[must_use]
    pub const fn method(&self) -> RouteMethod {
        self.method
    }

    /// Full route path relative to the plugin mount prefix.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Envelope action sent to the plugin when the route is hit.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }
}

/// Computes the route table for a descriptor.
///
/// Unsupported methods are skipped here, silently apart from a debug
/// trace, so they never reach the router.
pub(crate) fn plan_routes(plugin: &str, descriptor: &CapabilityDescriptor) -> Vec<RoutePlan> {
    let prefix = descriptor.route_prefix();
    let mut plans = Vec::with_capacity(descriptor.api_paths().len());
    for (suffix, spec) in descriptor.api_paths() {
        match spec.method() {
            RouteMethod::Get | RouteMethod::Post => plans.push(RoutePlan {
                plugin: plugin.to_owned(),
                method: spec.method(),
                path: format!("{prefix}{suffix}"),
                action: action_for_suffix(suffix),
            }),
            RouteMethod::Unsupported => {
                debug!(
                    target: BINDER_TARGET,
                    plugin = %plugin,
                    suffix = %suffix,
                    "skipping route with unsupported method"
                );
            }
        }
    }
    plans
}

/// Folds a route table into the router, attaching live handlers.
pub(crate) fn bind_routes<E>(
    mut router: Router,
    invoker: &Arc<PluginInvoker<E>>,
    record: &Arc<PluginRecord>,
    plans: &[RoutePlan],
) -> Router
where
    E: CommandExecutor + 'static,
{
    for plan in plans {
        router = match plan.method() {
            RouteMethod::Get => router.route(
                plan.path(),
                get(proxy_handler(
                    Arc::clone(invoker),
                    Arc::clone(record),
                    plan.action().to_owned(),
                )),
            ),
            RouteMethod::Post => router.route(plan.path(), post(post_placeholder)),
            RouteMethod::Unsupported => router,
        };
    }
    router
}

/// Builds the async handler for a proxied `GET` route.
///
/// Invocation is synchronous process work, so it runs on the blocking
/// pool rather than the async executor.
fn proxy_handler<E>(
    invoker: Arc<PluginInvoker<E>>,
    record: Arc<PluginRecord>,
    action: String,
) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = (StatusCode, Json<Value>)> + Send>>
+ Clone
+ Send
+ 'static
where
    E: CommandExecutor + 'static,
{
    move || {
        let invoker = Arc::clone(&invoker);
        let record = Arc::clone(&record);
        let action = action.clone();
        Box::pin(async move {
            let plugin = record.name().to_owned();
            let joined = tokio::task::spawn_blocking(move || {
                let envelope = RequestEnvelope::new(action);
                invoker.invoke(&record, &envelope)
            })
            .await;
            match joined {
                Ok(result) => translate(result, &plugin),
                Err(join_error) => {
                    error!(
                        target: BINDER_TARGET,
                        plugin = %plugin,
                        error = %join_error,
                        "plugin invocation task failed"
                    );
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(internal_error_body()))
                }
            }
        })
    }
}

// POST dispatch into plugins is not wired up yet; the route answers so
// descriptor-declared POST paths are reserved rather than 404s.
async fn post_placeholder() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "accepted",
            "message": "POST handling not yet implemented",
        })),
    )
}
