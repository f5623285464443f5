//! DRBD status and role resolution
//!
//! Exactly one resource is queried per call; the status tool always
//! returns single-resource payloads.

mod errors;
mod role;
mod status;

pub use errors::{StatusError, StatusResult};
pub use role::{ResourceRole, RoleResolver};
pub use status::{Drbdsetup, PeerConnection, ResourceStatus, StatusSource};
