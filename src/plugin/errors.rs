//! # Plugin Descriptor Errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for descriptor construction
pub type PluginResult<T> = Result<T, PluginError>;

/// Descriptor construction errors
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    #[error("could not parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid {kind} entry in '{}': {message}", path.display())]
    InvalidEntry {
        path: PathBuf,
        kind: &'static str,
        message: String,
    },
}
