//! Plugin descriptor model
//!
//! Typed views over the plugins declared in configuration snippets:
//! promoter, prometheus (metrics endpoint), umh (user mode handler) and
//! debugger.

mod descriptor;
mod errors;
mod start;
mod template;

pub use descriptor::{
    Metrics, PluginDescriptor, PluginInfo, PluginKind, Promoter, ResourceSpec, Runner,
    DEFAULT_METRICS_ADDRESS, NO_ID,
};
pub use errors::{PluginError, PluginResult};
pub use start::unit_for_start_entry;
pub use template::template;
