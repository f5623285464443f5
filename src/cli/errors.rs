//! CLI-specific error types
//!
//! Every module error ends up here and is printed once by `main`.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::evict::EvictError;
use crate::plugin::PluginError;
use crate::snippets::SnippetError;
use crate::systemd::SystemdError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Main configuration missing or unusable
    ConfigError,
    /// Snippet could not be read, parsed or renamed
    SnippetError,
    /// Evict refused before anything was changed
    PreconditionFailed,
    /// A must-succeed external command failed
    CommandFailed,
    /// I/O error (stdin/stdout, editor, scratch files)
    IoError,
    /// Edit ended without a usable snippet
    EditAborted,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "REACTORCTL_CONFIG_ERROR",
            Self::SnippetError => "REACTORCTL_SNIPPET_ERROR",
            Self::PreconditionFailed => "REACTORCTL_PRECONDITION_FAILED",
            Self::CommandFailed => "REACTORCTL_COMMAND_FAILED",
            Self::IoError => "REACTORCTL_IO_ERROR",
            Self::EditAborted => "REACTORCTL_EDIT_ABORTED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// External command failed
    pub fn command_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::CommandFailed, msg)
    }

    /// Edit aborted
    pub fn edit_aborted(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::EditAborted, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<SnippetError> for CliError {
    fn from(e: SnippetError) -> Self {
        Self::new(CliErrorCode::SnippetError, e.to_string())
    }
}

impl From<PluginError> for CliError {
    fn from(e: PluginError) -> Self {
        Self::new(CliErrorCode::SnippetError, e.to_string())
    }
}

impl From<SystemdError> for CliError {
    fn from(e: SystemdError) -> Self {
        Self::command_failed(e.to_string())
    }
}

impl From<EvictError> for CliError {
    fn from(e: EvictError) -> Self {
        let code = match &e {
            e if e.is_precondition() => CliErrorCode::PreconditionFailed,
            EvictError::Snippet(_) => CliErrorCode::SnippetError,
            _ => CliErrorCode::CommandFailed,
        };
        Self::new(code, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_display_carries_code() {
        let err = CliError::edit_aborted("no changes");
        assert_eq!(err.to_string(), "REACTORCTL_EDIT_ABORTED: no changes");
        assert_eq!(err.message(), "no changes");
    }

    #[test]
    fn test_config_conversion() {
        let err: CliError = ConfigError::MainConfigMissing(PathBuf::from("/etc/x.toml")).into();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert!(err.message().contains("/etc/x.toml"));
    }

    #[test]
    fn test_evict_precondition_code() {
        let err: CliError = EvictError::InvalidDelay(0).into();
        assert_eq!(err.code_str(), "REACTORCTL_PRECONDITION_FAILED");

        let err: CliError = EvictError::NoSourceFile("r0".into()).into();
        assert_eq!(err.code_str(), "REACTORCTL_COMMAND_FAILED");
    }
}
