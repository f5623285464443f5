//! Storage status query
//!
//! `drbdsetup status --json <res>` prints an array with exactly one
//! resource object. Only the fields needed for role resolution are decoded.

use std::fmt;
use std::process::Command;

use serde::Deserialize;

use super::errors::{StatusError, StatusResult};

/// Source of raw status payloads for a single resource
pub trait StatusSource: fmt::Debug {
    /// JSON status payload for `resource`
    fn status_json(&self, resource: &str) -> StatusResult<String>;
}

/// `drbdsetup` backed status source
#[derive(Debug, Clone, Default)]
pub struct Drbdsetup;

impl StatusSource for Drbdsetup {
    fn status_json(&self, resource: &str) -> StatusResult<String> {
        let out = Command::new("drbdsetup")
            .args(["status", "--json", resource])
            .output()?;
        if !out.status.success() {
            return Err(StatusError::Failed {
                resource: resource.to_string(),
                status: out.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

/// One peer connection as reported by the status query
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PeerConnection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "peer-role", default)]
    pub peer_role: String,
}

/// The part of a resource status payload the resolver reads
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ResourceStatus {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub connections: Vec<PeerConnection>,
}

impl ResourceStatus {
    /// Decode a payload, taking the first (and only) resource
    pub fn parse(resource: &str, payload: &str) -> StatusResult<Self> {
        let mut all: Vec<ResourceStatus> = serde_json::from_str(payload)?;
        if all.is_empty() {
            return Err(StatusError::Empty(resource.to_string()));
        }
        Ok(all.swap_remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_payload() {
        let payload = r#"[{"name":"r0","node-id":1,"role":"Secondary","suspended":false,
            "connections":[{"peer-node-id":2,"name":"nodeB","connection-state":"Connected",
            "peer-role":"Primary","peer_devices":[]}]}]"#;
        let status = ResourceStatus::parse("r0", payload).unwrap();
        assert_eq!(status.name, "r0");
        assert_eq!(status.role, "Secondary");
        assert_eq!(status.connections.len(), 1);
        assert_eq!(status.connections[0].name.as_deref(), Some("nodeB"));
        assert_eq!(status.connections[0].peer_role, "Primary");
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(matches!(
            ResourceStatus::parse("r0", "[]"),
            Err(StatusError::Empty(_))
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            ResourceStatus::parse("r0", "no such resource"),
            Err(StatusError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_connections_default() {
        let status = ResourceStatus::parse("r0", r#"[{"role":"Primary"}]"#).unwrap();
        assert!(status.connections.is_empty());
    }
}
