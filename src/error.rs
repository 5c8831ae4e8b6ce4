//! Crate error types

use std::net::SocketAddr;
use std::path::PathBuf;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for server and persistence operations
///
/// Only `Bind` is fatal to the process; snapshot errors are logged and
/// swallowed by their callers, and connection I/O errors are confined to the
/// task that hit them.
#[derive(Debug)]
pub enum Error {
    /// Failed to bind the listening socket
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    /// Snapshot file could not be read or written
    Snapshot {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Connection-level I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Bind { addr, source } => write!(f, "failed to bind {}: {}", addr, source),
            Error::Snapshot { path, source } => {
                write!(f, "snapshot file {}: {}", path.display(), source)
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Bind { source, .. } => Some(source),
            Error::Snapshot { source, .. } => Some(source),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
