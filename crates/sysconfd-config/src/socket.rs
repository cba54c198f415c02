//! Socket filesystem preparation for the daemon's Unix endpoint.

use std::fs::DirBuilder;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Ensures the socket's parent directory exists with restrictive permissions.
///
/// The directory is created mode `0o750`; socket file permissions themselves
/// are governed by the process umask at bind time.
///
/// # Errors
///
/// Returns [`SocketPreparationError`] when the path has no parent or the
/// directory cannot be created.
pub fn prepare_socket_filesystem(path: &Utf8Path) -> Result<(), SocketPreparationError> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Err(SocketPreparationError::MissingParent {
            path: path.to_path_buf(),
        });
    };

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o750);
    }

    if let Err(source) = builder.create(parent.as_std_path())
        && source.kind() != std::io::ErrorKind::AlreadyExists
    {
        return Err(SocketPreparationError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        });
    }

    Ok(())
}

/// Errors raised when preparing socket directories.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    /// Parent directory is missing from the socket path.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent {
        /// The offending socket path.
        path: Utf8PathBuf,
    },
    /// Failed to create the socket directory.
    #[error("failed to create socket directory '{path}': {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        #[source]
        /// Underlying filesystem error.
        source: std::io::Error,
    },
}
