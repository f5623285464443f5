//! CLI argument definitions using clap
//!
//! Commands:
//! - drbd-reactorctl status [-v] [--json] [-r RES]... [config...]
//! - drbd-reactorctl ls [--disabled] [config...]
//! - drbd-reactorctl cat [config...]
//! - drbd-reactorctl disable [--now] [config...]
//! - drbd-reactorctl enable [config...]
//! - drbd-reactorctl restart [--with-targets] [config...]
//! - drbd-reactorctl edit [-t TYPE] [--disabled] <config>
//! - drbd-reactorctl rm [-f] [--disabled] <config>...
//! - drbd-reactorctl evict [-d N] [-f] [config...]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG;
use crate::console::ColorChoice;
use crate::evict::DEFAULT_DELAY;
use crate::observability::Severity;
use crate::plugin::PluginKind;

/// Control the drbd-reactor daemon and its plugin snippets
#[derive(Parser, Debug)]
#[command(name = "drbd-reactorctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the main configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Colored output
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Minimum severity of diagnostic log lines on stderr
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: Severity,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show plugin status (default)
    Status {
        /// Show unit status instead of unit dependencies
        #[arg(short, long)]
        verbose: bool,

        /// Print a JSON report
        #[arg(long)]
        json: bool,

        /// Only show these promoter resources
        #[arg(short, long = "resource")]
        resources: Vec<String>,

        /// Configs to show
        configs: Vec<String>,
    },

    /// List enabled/disabled files and their plugins
    Ls {
        /// Show disabled snippets
        #[arg(long)]
        disabled: bool,

        /// Configs to list
        configs: Vec<String>,
    },

    /// Print plugin snippets
    Cat {
        /// Configs to print
        configs: Vec<String>,
    },

    /// Disable plugin snippets
    Disable {
        /// Also stop the services targets of disabled promoters
        #[arg(long)]
        now: bool,

        /// Configs to disable
        configs: Vec<String>,
    },

    /// Enable disabled plugin snippets
    Enable {
        /// Configs to enable
        configs: Vec<String>,
    },

    /// Restart the daemon if no configs are given, otherwise the given plugins
    Restart {
        /// Also restart the services targets of promoters
        #[arg(long)]
        with_targets: bool,

        /// Configs to restart
        configs: Vec<String>,
    },

    /// Edit (or create) a plugin snippet
    Edit {
        /// Plugin type of a new snippet
        #[arg(short = 't', long = "type", value_enum, default_value_t = PluginKind::Promoter)]
        kind: PluginKind,

        /// Edit the disabled snippet
        #[arg(long)]
        disabled: bool,

        /// Config to edit
        #[arg(value_name = "CONFIG")]
        name: String,
    },

    /// Remove plugin snippets
    Rm {
        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,

        /// Remove disabled snippets
        #[arg(long)]
        disabled: bool,

        /// Configs to remove
        #[arg(required = true)]
        configs: Vec<String>,
    },

    /// Evict promoter resources of the given snippets to a peer
    Evict {
        /// Seconds to wait for a peer to take over
        #[arg(short, long, default_value_t = DEFAULT_DELAY, value_parser = clap::value_parser!(u32).range(1..))]
        delay: u32,

        /// Skip the one plugin per snippet, one resource per promoter checks
        #[arg(short, long)]
        force: bool,

        /// Configs to evict
        configs: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// The selected command; `status` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Status {
            verbose: false,
            json: false,
            resources: Vec::new(),
            configs: Vec::new(),
        })
    }
}
