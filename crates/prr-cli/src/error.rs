//! Error types for prr-cli

use prr_core::SyncStage;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
///
/// Core errors display as `<kind>: <message>`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from prr-core
    #[error("{kind}: {0}", kind = .0.kind())]
    Core(#[from] prr_core::Error),

    /// A synchronization run that stopped early
    #[error("{}: {source} (while {stage})", .source.kind())]
    Aborted {
        stage: SyncStage,
        source: prr_core::Error,
    },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
