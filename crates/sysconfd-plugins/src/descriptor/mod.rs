//! Capability descriptor loading.
//!
//! A descriptor is the per-plugin JSON file declaring the plugin's API
//! mount point, API name, authorship metadata, and its path specification
//! table. Descriptors are loaded lazily per enabled plugin and never
//! mutated after load. A descriptor that fails to load costs that plugin
//! its routes but never aborts daemon startup.

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;
use crate::registry::PluginRecord;

/// HTTP method declared by a path specification.
///
/// Only `GET` and `POST` are currently supported by the dispatch
/// subsystem. Any other method string decodes to [`RouteMethod::Unsupported`]
/// instead of failing the whole descriptor; the route binder skips such
/// entries without raising an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteMethod {
    /// Proxied to the plugin executable.
    #[serde(rename = "GET")]
    Get,
    /// Bound as a placeholder acknowledgement; not yet proxied.
    #[serde(rename = "POST")]
    Post,
    /// Any other method value; silently skipped by the route binder.
    #[serde(other, rename = "UNSUPPORTED")]
    Unsupported,
}

impl RouteMethod {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Unsupported => "UNSUPPORTED",
        }
    }
}

impl std::fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specification of a single route suffix.
///
/// Beyond the method, descriptors may carry method-specific metadata;
/// it is preserved as-is but not interpreted by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSpec {
    method: RouteMethod,
    #[serde(default, flatten)]
    metadata: BTreeMap<String, serde_json::Value>,
}

impl PathSpec {
    /// Creates a spec with no extra metadata.
    #[must_use]
    pub const fn new(method: RouteMethod) -> Self {
        Self {
            method,
            metadata: BTreeMap::new(),
        }
    }

    /// Returns the declared HTTP method.
    #[must_use]
    pub const fn method(&self) -> RouteMethod {
        self.method
    }

    /// Returns the method-specific metadata.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }
}

/// Per-plugin capability descriptor.
///
/// The path specification table (`apiPaths`) maps route suffixes such as
/// `/discover` to their [`PathSpec`]. A `BTreeMap` keeps route
/// registration order deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    #[serde(default)]
    name: String,
    #[serde(rename = "apiMountPoint")]
    api_mount_point: String,
    #[serde(rename = "apiName")]
    api_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    license: String,
    #[serde(default, rename = "apiPaths")]
    api_paths: BTreeMap<String, PathSpec>,
}

impl CapabilityDescriptor {
    /// Returns the descriptor's declared plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the API mount point, e.g. `/hardware`.
    #[must_use]
    pub fn api_mount_point(&self) -> &str {
        self.api_mount_point.as_str()
    }

    /// Returns the API name used to build the route prefix.
    #[must_use]
    pub fn api_name(&self) -> &str {
        self.api_name.as_str()
    }

    /// Returns the descriptor's free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the declared author.
    #[must_use]
    pub fn author(&self) -> &str {
        self.author.as_str()
    }

    /// Returns the declared license.
    #[must_use]
    pub fn license(&self) -> &str {
        self.license.as_str()
    }

    /// Returns the path specification table in suffix order.
    #[must_use]
    pub const fn api_paths(&self) -> &BTreeMap<String, PathSpec> {
        &self.api_paths
    }

    /// Computes the route prefix: mount point + `/` + API name.
    #[must_use]
    pub fn route_prefix(&self) -> String {
        format!("{}/{}", self.api_mount_point, self.api_name)
    }
}

/// Loads the capability descriptor named by a registry record.
///
/// Intended to be called only for enabled records; the caller enforces
/// that policy.
///
/// # Errors
///
/// Returns [`DescriptorError::NotFound`] when the descriptor file is
/// absent and [`DescriptorError::Malformed`] when it fails to decode.
pub fn load_descriptor(record: &PluginRecord) -> Result<CapabilityDescriptor, DescriptorError> {
    let path = record.meta_data();
    if !path.exists() {
        return Err(DescriptorError::NotFound {
            plugin: record.name().to_owned(),
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path).map_err(|source| DescriptorError::Io {
        plugin: record.name().to_owned(),
        source: Arc::new(source),
    })?;

    serde_json::from_str(&contents).map_err(|source| DescriptorError::Malformed {
        plugin: record.name().to_owned(),
        path: path.to_path_buf(),
        source,
    })
}
