//! Error types for prr-fs

use std::path::PathBuf;

/// Result type for prr-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in prr-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file operation failed
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file did not deserialize
    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    /// The sidecar lock stayed contended past the timeout
    #[error("Timed out waiting for the lock on {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
