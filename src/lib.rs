//! reactorctl - control the drbd-reactor daemon and its plugin snippets
//!
//! The daemon reads one main TOML file plus a directory of snippets,
//! each declaring promoter, prometheus, umh or debugger plugins. This
//! crate enables, disables, edits and inspects those snippets, and
//! evicts promoter resources to a peer node.

pub mod cli;
pub mod config;
pub mod console;
pub mod drbd;
pub mod evict;
pub mod observability;
pub mod plugin;
pub mod snippets;
pub mod status;
pub mod systemd;
