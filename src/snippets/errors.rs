//! # Snippet Repository Errors

use std::path::PathBuf;

use thiserror::Error;

use crate::plugin::PluginError;

/// Result type for snippet operations
pub type SnippetResult<T> = Result<T, SnippetError>;

/// Snippet repository errors
#[derive(Debug, Error)]
pub enum SnippetError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("can not enable '{}', it does not end with .disabled", .0.display())]
    NotDisabled(PathBuf),

    #[error("'{}' already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("'{}' does not exist", .0.display())]
    NotFound(PathBuf),
}

impl SnippetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SnippetError::Io {
            path: path.into(),
            source,
        }
    }
}
