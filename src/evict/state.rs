//! Per-resource eviction state machine
//!
//! ```text
//! Idle -> Disabling -> Waiting(n) -> {TakenOver | StillLocal | StillUnknown}
//!                          |                         |
//!                          +-------> Reenabling <----+ -> Done
//! ```
//!
//! Reenabling is reachable from every state after Idle; that is how a
//! failed or interrupted eviction still ends with its snippet enabled.

use super::errors::{EvictError, EvictResult};
use crate::drbd::ResourceRole;

/// Eviction state of one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvictState {
    /// Nothing changed yet
    Idle,
    /// Snippet disabled, daemon reloaded, target being stopped
    Disabling,
    /// Polling for a peer, `remaining` seconds left
    Waiting { remaining: u32 },
    /// A peer became Primary
    TakenOver { peer: String },
    /// The deadline passed and this node is still Primary
    StillLocal,
    /// The deadline passed and nobody is known to be Primary
    StillUnknown,
    /// Snippet is being renamed back
    Reenabling,
    /// Snippet enabled again
    Done,
}

impl Default for EvictState {
    fn default() -> Self {
        Self::Idle
    }
}

impl EvictState {
    /// State name for logging
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Disabling => "Disabling",
            Self::Waiting { .. } => "Waiting",
            Self::TakenOver { .. } => "TakenOver",
            Self::StillLocal => "StillLocal",
            Self::StillUnknown => "StillUnknown",
            Self::Reenabling => "Reenabling",
            Self::Done => "Done",
        }
    }

    fn forbidden(&self, to: &'static str) -> EvictError {
        EvictError::ForbiddenTransition {
            from: self.state_name(),
            to,
        }
    }

    // =========================================================================
    // ALLOWED TRANSITIONS
    // =========================================================================

    /// Idle → Disabling
    pub fn begin_disable(self) -> EvictResult<Self> {
        match self {
            Self::Idle => Ok(Self::Disabling),
            other => Err(other.forbidden("Disabling")),
        }
    }

    /// Disabling → Waiting
    pub fn begin_wait(self, delay: u32) -> EvictResult<Self> {
        match self {
            Self::Disabling => Ok(Self::Waiting { remaining: delay }),
            other => Err(other.forbidden("Waiting")),
        }
    }

    /// Waiting(n) → Waiting(n - 1)
    pub fn tick(self) -> EvictResult<Self> {
        match self {
            Self::Waiting { remaining } => Ok(Self::Waiting {
                remaining: remaining.saturating_sub(1),
            }),
            other => Err(other.forbidden("Waiting")),
        }
    }

    /// Waiting → outcome, by the last observed role
    pub fn classify(self, role: &ResourceRole) -> EvictResult<Self> {
        match self {
            Self::Waiting { .. } => Ok(match role {
                ResourceRole::Peer(peer) => Self::TakenOver { peer: peer.clone() },
                ResourceRole::ThisNode => Self::StillLocal,
                ResourceRole::Unknown => Self::StillUnknown,
            }),
            other => Err(other.forbidden("outcome")),
        }
    }

    /// Anything after Idle → Reenabling
    pub fn begin_reenable(self) -> EvictResult<Self> {
        match self {
            Self::Idle | Self::Reenabling | Self::Done => Err(self.forbidden("Reenabling")),
            _ => Ok(Self::Reenabling),
        }
    }

    /// Reenabling → Done
    pub fn finish(self) -> EvictResult<Self> {
        match self {
            Self::Reenabling => Ok(Self::Done),
            other => Err(other.forbidden("Done")),
        }
    }
}
