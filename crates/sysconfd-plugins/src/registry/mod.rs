//! Plugin registry loading and record validation.
//!
//! The registry is the top-level JSON file listing all known plugins and
//! whether each is enabled. It is read once at startup and never mutated
//! afterwards; changes take effect only on daemon restart. Loading performs
//! syntax and format-version checks, while record-level validation is a
//! separate step that runs before any descriptor is touched.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::RegistryError;

/// Tracing target for registry operations.
const REGISTRY_TARGET: &str = "sysconfd_plugins::registry";

/// The only registry format version this daemon understands.
pub const REGISTRY_FORMAT_VERSION: u32 = 1;

/// File name of the registry fallback inside the configuration directory.
const FALLBACK_FILE_NAME: &str = "plugins.json";

/// A single plugin entry in the registry.
///
/// Records are immutable after load. The `metaData` key names the plugin's
/// capability descriptor file; `path` names the directory holding the
/// plugin executable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PluginRecord {
    name: String,
    path: PathBuf,
    #[serde(rename = "metaData")]
    meta_data: PathBuf,
    enabled: bool,
    #[serde(default)]
    description: String,
}

impl PluginRecord {
    /// Creates a record, primarily for construction in tests and tools.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        meta_data: impl Into<PathBuf>,
        enabled: bool,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            meta_data: meta_data.into(),
            enabled,
            description: String::new(),
        }
    }

    /// Attaches a free-text description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the directory declared for the plugin executable.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Returns the path of the plugin's capability descriptor.
    #[must_use]
    pub fn meta_data(&self) -> &Path {
        self.meta_data.as_path()
    }

    /// Returns whether the plugin is enabled.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err(String::from("plugin name is required"));
        }
        if self.path.as_os_str().is_empty() {
            return Err(String::from("plugin path is required"));
        }
        Ok(())
    }
}

/// The parsed plugin registry: a format version plus an ordered record list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PluginRegistry {
    version: u32,
    plugins: Vec<PluginRecord>,
}

impl PluginRegistry {
    /// Builds a registry from records, for tests and tools.
    #[must_use]
    pub fn new(plugins: Vec<PluginRecord>) -> Self {
        Self {
            version: REGISTRY_FORMAT_VERSION,
            plugins,
        }
    }

    /// Returns the declared format version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the registry records in file order.
    #[must_use]
    pub fn plugins(&self) -> &[PluginRecord] {
        &self.plugins
    }

    /// Validates every record structurally.
    ///
    /// Runs before any descriptor is loaded; a single bad record aborts
    /// startup, matching the configuration-error policy.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidRecord`] for the first record whose
    /// `name` or `path` is empty, or whose `name` repeats an earlier
    /// record's.
    pub fn validate_records(&self) -> Result<(), RegistryError> {
        let mut seen = std::collections::HashSet::new();
        for (index, record) in self.plugins.iter().enumerate() {
            record
                .validate()
                .map_err(|message| RegistryError::InvalidRecord { index, message })?;
            if !seen.insert(record.name()) {
                return Err(RegistryError::InvalidRecord {
                    index,
                    message: format!("duplicate plugin name '{}'", record.name()),
                });
            }
        }
        Ok(())
    }
}

/// Loads the plugin registry from `primary`, falling back to
/// `<config_dir>/plugins.json` when the primary path does not exist.
///
/// The chosen path is canonicalised before reading so symlinks and relative
/// components are resolved. Loading only reads the file; it never executes
/// plugin code.
///
/// # Errors
///
/// Returns [`RegistryError::NotFound`] when both candidate paths are
/// absent, [`RegistryError::Malformed`] on JSON errors, and
/// [`RegistryError::UnsupportedVersion`] when the format version is not 1.
pub fn load_registry(primary: &Path, config_dir: &Path) -> Result<PluginRegistry, RegistryError> {
    let path = resolve_registry_path(primary, config_dir)?;

    let contents = fs::read_to_string(&path).map_err(|source| RegistryError::Io {
        path: path.clone(),
        source: Arc::new(source),
    })?;

    let registry: PluginRegistry =
        serde_json::from_str(&contents).map_err(|source| RegistryError::Malformed {
            path: path.clone(),
            source,
        })?;

    if registry.version != REGISTRY_FORMAT_VERSION {
        return Err(RegistryError::UnsupportedVersion {
            version: registry.version,
        });
    }

    info!(
        target: REGISTRY_TARGET,
        path = %path.display(),
        plugins = registry.plugins.len(),
        "loaded plugin registry"
    );
    for record in &registry.plugins {
        info!(
            target: REGISTRY_TARGET,
            plugin = record.name(),
            enabled = record.enabled(),
            "discovered plugin record"
        );
    }

    Ok(registry)
}

fn resolve_registry_path(primary: &Path, config_dir: &Path) -> Result<PathBuf, RegistryError> {
    let candidate = if primary.exists() {
        primary.to_path_buf()
    } else {
        warn!(
            target: REGISTRY_TARGET,
            path = %primary.display(),
            "plugin registry file not found, trying configuration directory"
        );
        let fallback = config_dir.join(FALLBACK_FILE_NAME);
        if !fallback.exists() {
            return Err(RegistryError::NotFound {
                primary: primary.to_path_buf(),
                fallback,
            });
        }
        fallback
    };

    fs::canonicalize(&candidate).map_err(|source| RegistryError::Io {
        path: candidate,
        source: Arc::new(source),
    })
}
