//! Error types for prr-core

use std::fmt;
use std::path::PathBuf;

/// Result type for prr-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification surfaced to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport failure while fetching a source
    Network,
    /// Corrupt membership descriptor or malformed rule store
    Format,
    /// Key-management executable missing, unlaunchable, or unsuccessful
    Process,
    /// Rule store or other local file unreadable, unwritable, or locked
    Io,
    /// Settings could not be resolved
    Config,
    /// The run was cancelled before completing
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network error",
            Self::Format => "format error",
            Self::Process => "process error",
            Self::Io => "I/O error",
            Self::Config => "configuration error",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in prr-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source could not be fetched
    #[error("Failed to fetch {url}: {message}")]
    Network { url: String, message: String },

    /// The membership descriptor did not contain exactly one group line
    #[error("Corrupt membership file: expected exactly one `group {address}=` line, found {found}")]
    MembershipFormat { address: String, found: usize },

    /// A token was not a key identifier
    #[error("Invalid key identifier: {0}")]
    InvalidKeyId(String),

    /// The rule store document is malformed or lacks expected structure
    #[error("Malformed rule store {path}: {message}")]
    RuleStoreFormat { path: PathBuf, message: String },

    /// The key-management executable could not be started or fed
    #[error("Failed to run {program}: {source}")]
    ProcessSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key-management executable reported failure
    #[error("Key import via {program} failed: {message}")]
    ProcessFailed {
        program: PathBuf,
        exit_code: Option<i32>,
        message: String,
    },

    /// Settings could not be resolved
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The run was cancelled
    #[error("Synchronization cancelled")]
    Cancelled,

    /// A blocking task panicked or was aborted
    #[error("Background task failed: {0}")]
    Task(String),

    /// Filesystem error from prr-fs
    #[error(transparent)]
    Fs(#[from] prr_fs::Error),
}

impl Error {
    pub fn network(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify this error for the presentation layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::MembershipFormat { .. } | Self::InvalidKeyId(_) | Self::RuleStoreFormat { .. } => {
                ErrorKind::Format
            }
            Self::ProcessSpawn { .. } | Self::ProcessFailed { .. } => ErrorKind::Process,
            Self::Config { .. } => ErrorKind::Config,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Task(_) => ErrorKind::Io,
            Self::Fs(inner) => match inner {
                prr_fs::Error::Io { .. } | prr_fs::Error::LockFailed { .. } => ErrorKind::Io,
                prr_fs::Error::ConfigParse { .. } | prr_fs::Error::UnsupportedFormat { .. } => {
                    ErrorKind::Config
                }
            },
        }
    }
}
