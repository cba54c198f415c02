//! Mount-point validation against the closed allow-list.
//!
//! The allow-list bounds the daemon's exposed API surface to known
//! configuration domains regardless of how many plugins are installed.
//! Plugins cannot introduce arbitrary top-level namespaces.

use crate::error::MountPointError;

/// The fixed set of permitted API mount points.
pub const ALLOWED_MOUNT_POINTS: [&str; 5] =
    ["/hardware", "/network", "/security", "/services", "/software"];

/// Validates a descriptor's API mount point.
///
/// Rules are applied in order: the value must be non-empty, must start
/// with `/`, and must be a member of [`ALLOWED_MOUNT_POINTS`].
///
/// # Errors
///
/// Returns [`MountPointError::Invalid`] for empty or malformed values and
/// [`MountPointError::NotPermitted`] for well-formed values outside the
/// allow-list.
pub fn validate_mount_point(value: &str) -> Result<(), MountPointError> {
    if value.is_empty() {
        return Err(MountPointError::Invalid {
            value: value.to_owned(),
        });
    }
    if !value.starts_with('/') {
        return Err(MountPointError::Invalid {
            value: value.to_owned(),
        });
    }
    if !ALLOWED_MOUNT_POINTS.contains(&value) {
        return Err(MountPointError::NotPermitted {
            value: value.to_owned(),
        });
    }
    Ok(())
}
