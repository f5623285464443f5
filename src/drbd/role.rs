//! Cluster role resolution
//!
//! Answers "who is Primary for this resource right now". The answer is
//! never cached: the daemon reacts to every change we make, so the role can
//! move between two queries. Every query failure maps to `Unknown`.

use std::fmt;

use serde::Serialize;

use super::status::{ResourceStatus, StatusSource};
use crate::observability::{warn_event, Event};

const PRIMARY: &str = "Primary";

/// Where a resource is currently Primary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "on", content = "node", rename_all = "snake_case")]
pub enum ResourceRole {
    /// The local node holds the Primary role
    ThisNode,
    /// The named peer holds the Primary role
    Peer(String),
    /// Nobody is known to be Primary, or the query failed
    Unknown,
}

impl ResourceRole {
    /// Whether a named peer holds the role
    pub fn is_peer(&self) -> bool {
        matches!(self, ResourceRole::Peer(_))
    }

    /// Classify an already decoded status payload
    pub fn from_status(status: &ResourceStatus) -> Self {
        if status.role == PRIMARY {
            return ResourceRole::ThisNode;
        }
        status
            .connections
            .iter()
            .find(|c| c.peer_role == PRIMARY)
            .and_then(|c| c.name.clone())
            .map(ResourceRole::Peer)
            .unwrap_or(ResourceRole::Unknown)
    }
}

impl fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRole::ThisNode => write!(f, "this node"),
            ResourceRole::Peer(name) => write!(f, "node '{}'", name),
            ResourceRole::Unknown => write!(f, "an unknown node"),
        }
    }
}

/// Resolves resource roles through a status source
#[derive(Debug)]
pub struct RoleResolver<'a> {
    source: &'a dyn StatusSource,
}

impl<'a> RoleResolver<'a> {
    /// Create a resolver over `source`
    pub fn new(source: &'a dyn StatusSource) -> Self {
        Self { source }
    }

    /// Current Primary of `resource`; any query failure yields `Unknown`
    pub fn primary_of(&self, resource: &str) -> ResourceRole {
        let status = self
            .source
            .status_json(resource)
            .and_then(|payload| ResourceStatus::parse(resource, &payload));

        match status {
            Ok(status) => ResourceRole::from_status(&status),
            Err(e) => {
                warn_event(
                    Event::RoleQueryFailed,
                    &[("resource", resource), ("error", &e.to_string())],
                );
                ResourceRole::Unknown
            }
        }
    }
}
