//! CLI module for drbd-reactorctl
//!
//! Provides command-line interface for:
//! - status, ls, cat: inspect plugin snippets
//! - disable, enable, restart, edit, rm: manage plugin snippets
//! - evict: hand a promoter resource over to a peer

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    cat, disable, edit, enable, evict, load_config, ls, remove, restart, run, run_command, status,
    Environment,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{ask, view_file, write_json, Editor, Prompt, StdinPrompt, SystemEditor};
