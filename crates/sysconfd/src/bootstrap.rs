//! Daemon bootstrap orchestration.

use std::sync::Arc;

use axum::Router;
use ortho_config::OrthoError;
use thiserror::Error;

use sysconfd_config::{Config, SocketPreparationError};
use sysconfd_plugins::{CommandExecutor, RegistryError, load_registry};

use crate::health::HealthReporter;
use crate::http::{RoutePlan, build_router};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's underlying error when configuration sources
    /// cannot be read or merged.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Socket preparation failed.
    #[error("failed to prepare daemon socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
    /// The plugin registry failed to load or validate.
    #[error("failed to load plugin registry: {source}")]
    Registry {
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Daemon {
    config: Config,
    telemetry: TelemetryHandle,
    router: Router,
    routes: Vec<RoutePlan>,
}

impl Daemon {
    fn new(
        config: Config,
        telemetry: TelemetryHandle,
        router: Router,
        routes: Vec<RoutePlan>,
    ) -> Self {
        Self {
            config,
            telemetry,
            router,
            routes,
        }
    }

    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Clones the assembled router for serving.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Table of plugin routes that were bound during bootstrap.
    #[must_use]
    pub fn routes(&self) -> &[RoutePlan] {
        &self.routes
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// Loads configuration, installs telemetry, prepares the socket
/// directory, loads and validates the plugin registry, and assembles the
/// router. Registry problems are startup-fatal; individual plugin
/// problems merely skip that plugin.
///
/// # Errors
///
/// Returns [`BootstrapError`] when any startup-fatal step fails.
pub fn bootstrap_with<E>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    executor: E,
) -> Result<Daemon, BootstrapError>
where
    E: CommandExecutor + 'static,
{
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    if let Err(source) = config.prepare_socket_filesystem() {
        let error = BootstrapError::Socket { source };
        reporter.bootstrap_failed(&error);
        return Err(error);
    }

    let registry = match load_registry(
        config.plugin_registry_file().as_std_path(),
        config.config_dir().as_std_path(),
    )
    .and_then(|registry| {
        registry.validate_records()?;
        Ok(registry)
    }) {
        Ok(registry) => registry,
        Err(source) => {
            let error = BootstrapError::Registry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let (router, routes) = build_router(&config, &registry, executor, reporter.as_ref());
    reporter.bootstrap_succeeded(&config);

    Ok(Daemon::new(config, telemetry, router, routes))
}
