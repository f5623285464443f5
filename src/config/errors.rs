//! # Configuration Errors
//!
//! All configuration errors are fatal and happen before any mutation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("main config file ('{}') does not exist", .0.display())]
    MainConfigMissing(PathBuf),

    #[error("could not access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("'{}' does not contain a \"snippets\" entry", .0.display())]
    SnippetsMissing(PathBuf),
}
