//! Eviction Error Types
//!
//! - Scope violations abort before any file is touched
//! - Snippet and service manager failures abort the current resource
//!   after its snippet has been re-enabled

use std::io;

use thiserror::Error;

use super::precheck::ScopeViolation;
use crate::snippets::SnippetError;
use crate::systemd::SystemdError;

/// Result type for eviction
pub type EvictResult<T> = Result<T, EvictError>;

/// Eviction errors
#[derive(Debug, Error)]
pub enum EvictError {
    #[error("{}", describe_violations(.0))]
    Scope(Vec<ScopeViolation>),

    #[error("delay must be a positive number of seconds, got {0}")]
    InvalidDelay(u32),

    #[error("promoter for '{0}' has no config file")]
    NoSourceFile(String),

    #[error("forbidden eviction transition: {from} -> {to}")]
    ForbiddenTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("could not catch interrupt signals: {0}")]
    Signals(#[source] io::Error),

    #[error(transparent)]
    Snippet(#[from] SnippetError),

    #[error(transparent)]
    Systemd(#[from] SystemdError),
}

fn describe_violations(violations: &[ScopeViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl EvictError {
    /// Whether this error was raised before anything was changed
    pub fn is_precondition(&self) -> bool {
        matches!(self, EvictError::Scope(_) | EvictError::InvalidDelay(_))
    }
}
