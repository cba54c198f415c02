//! Unix-domain-socket HTTP serving with graceful shutdown.

use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::UnixStream;
use std::path::Path;

use axum::Router;
use thiserror::Error;
use tracing::{info, warn};

use sysconfd_config::Config;

const SERVER_TARGET: &str = "sysconfd::server";

/// Errors surfaced while binding or serving the daemon socket.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Reading metadata of an existing socket path failed.
    #[error("failed to inspect socket path {path}: {source}")]
    Metadata {
        /// Socket path under inspection.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// The socket path exists but is not a socket.
    #[error("socket path {path} exists and is not a socket")]
    NotSocket {
        /// Offending path.
        path: String,
    },
    /// Another daemon instance is already serving on the socket.
    #[error("socket {path} is already in use")]
    InUse {
        /// Contended socket path.
        path: String,
    },
    /// Probing an existing socket failed for an unexpected reason.
    #[error("failed to probe existing socket {path}: {source}")]
    Probe {
        /// Socket path being probed.
        path: String,
        /// Underlying connection error.
        #[source]
        source: io::Error,
    },
    /// Removing a stale socket file failed.
    #[error("failed to remove stale socket {path}: {source}")]
    Cleanup {
        /// Stale socket path.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// Binding the listener failed.
    #[error("failed to bind socket {path}: {source}")]
    Bind {
        /// Socket path that could not be bound.
        path: String,
        /// Underlying bind error.
        #[source]
        source: io::Error,
    },
    /// The accept loop terminated with an error.
    #[error("server error: {source}")]
    Serve {
        /// Underlying server error.
        #[source]
        source: io::Error,
    },
}

/// Serves the router over the configured Unix domain socket until a
/// shutdown signal arrives, then removes the socket file.
///
/// # Errors
///
/// Returns [`ServeError`] when the socket cannot be claimed or the server
/// loop fails.
pub async fn serve(config: &Config, router: Router) -> Result<(), ServeError> {
    // Restrict every file the daemon creates, the socket included, to the
    // owning user before anything touches the filesystem.
    // SAFETY: umask has no safety preconditions; it only updates the
    // process file-mode creation mask.
    unsafe {
        libc::umask(0o077);
    }

    let path = config.socket_path().as_std_path();
    claim_socket_path(path)?;

    let listener =
        tokio::net::UnixListener::bind(path).map_err(|source| ServeError::Bind {
            path: path.display().to_string(),
            source,
        })?;

    info!(
        target: SERVER_TARGET,
        socket = %path.display(),
        "daemon listening"
    );

    let result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ServeError::Serve { source });

    cleanup_socket(path);
    result
}

/// Ensures the socket path is free, removing a stale socket left by a
/// previous instance.
///
/// A connectable socket means another instance is live and the daemon
/// must not steal its endpoint.
fn claim_socket_path(path: &Path) -> Result<(), ServeError> {
    if !path.exists() {
        return Ok(());
    }

    let metadata = fs::symlink_metadata(path).map_err(|source| ServeError::Metadata {
        path: path.display().to_string(),
        source,
    })?;
    if !metadata.file_type().is_socket() {
        return Err(ServeError::NotSocket {
            path: path.display().to_string(),
        });
    }

    match UnixStream::connect(path) {
        Ok(_stream) => Err(ServeError::InUse {
            path: path.display().to_string(),
        }),
        Err(error)
            if error.kind() == io::ErrorKind::ConnectionRefused
                || error.kind() == io::ErrorKind::NotFound =>
        {
            warn!(
                target: SERVER_TARGET,
                socket = %path.display(),
                "removing stale socket file"
            );
            fs::remove_file(path).map_err(|source| ServeError::Cleanup {
                path: path.display().to_string(),
                source,
            })
        }
        Err(source) => Err(ServeError::Probe {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn cleanup_socket(path: &Path) {
    if let Err(error) = fs::remove_file(path)
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: SERVER_TARGET,
            error = %error,
            socket = %path.display(),
            "failed to remove unix socket file"
        );
    }
}

/// Resolves when SIGINT or SIGTERM is delivered.
///
/// A signal source that cannot be registered is logged and parked rather
/// than treated as fatal, so the remaining source still drives shutdown.
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let sigint = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(
                target: SERVER_TARGET,
                error = %error,
                "failed to listen for SIGINT"
            );
            std::future::pending::<()>().await;
        }
    };

    let sigterm = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(
                    target: SERVER_TARGET,
                    error = %error,
                    "failed to register SIGTERM handler"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        () = sigint => {},
        () = sigterm => {},
    }

    info!(target: SERVER_TARGET, "shutdown signal received");
}
