//! # Storage Status Errors
//!
//! None of these reach the operator as failures: the role resolver turns
//! every one of them into an unknown role.

use thiserror::Error;

/// Result type for storage status queries
pub type StatusResult<T> = Result<T, StatusError>;

/// Storage status query errors
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("could not execute drbdsetup: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("drbdsetup status for '{resource}' failed ({status})")]
    Failed { resource: String, status: String },

    #[error("malformed status payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("status payload for '{0}' is empty")]
    Empty(String),
}
