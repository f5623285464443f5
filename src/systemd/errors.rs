//! # Service Manager Errors

use thiserror::Error;

/// Result type for service manager operations
pub type SystemdResult<T> = Result<T, SystemdError>;

/// Service manager errors
#[derive(Debug, Error)]
pub enum SystemdError {
    #[error("could not execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed ({status})")]
    Failed { command: String, status: String },
}

impl SystemdError {
    /// The command line that failed
    pub fn command(&self) -> &str {
        match self {
            SystemdError::Spawn { command, .. } => command,
            SystemdError::Failed { command, .. } => command,
        }
    }
}
