//! The JSON envelope protocol spoken with plugin executables.
//!
//! The daemon writes one [`RequestEnvelope`] to the plugin's standard
//! input as a single JSON document (no framing or length prefix) and
//! reads one JSON document from its standard output after process exit.
//! The response shape is not constrained beyond "valid JSON".

use serde::{Deserialize, Serialize};

/// Envelope format version sent to every plugin.
pub const PROTOCOL_VERSION: u32 = 1;

/// Opaque JSON value read from a plugin's standard output.
pub type ResponseEnvelope = serde_json::Value;

/// Request payload written to a plugin's standard input.
///
/// The `action` value is derived from the invoked route, never from
/// arbitrary client input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    version: u32,
    action: String,
}

impl RequestEnvelope {
    /// Creates an envelope for the given action at the current protocol
    /// version.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            action: action.into(),
        }
    }

    /// Returns the protocol version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the action name.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }
}

/// Derives the envelope action for a descriptor route suffix.
///
/// Known suffixes map through a fixed table; anything else falls back to
/// the suffix with its leading `/` stripped so descriptor-declared routes
/// are never unroutable.
#[must_use]
pub fn action_for_suffix(suffix: &str) -> String {
    match suffix {
        "/discover" => String::from("discover"),
        "/readConfig" => String::from("readConfig"),
        other => other.trim_start_matches('/').to_owned(),
    }
}
