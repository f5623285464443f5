//! Plugin status reporting
//!
//! Text mode mirrors what an operator would run by hand: the resource
//! role, then the service manager's view of the units involved. JSON
//! mode reports the same plugins with their roles and touches nothing
//! but the status source.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::console::{Color, Console};
use crate::drbd::{ResourceRole, RoleResolver, StatusSource};
use crate::plugin::{unit_for_start_entry, Metrics, PluginDescriptor, Promoter};
use crate::systemd::{promote_service, DaemonControl};

/// Timeout of the metrics endpoint HTTP GET
pub const HTTP_GET_TIMEOUT: Duration = Duration::from_secs(2);

/// Status flags
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    /// Show unit status instead of unit dependencies
    pub verbose: bool,
    /// Only report these promoter resources; empty means all
    pub resources: Vec<String>,
}

impl StatusOptions {
    fn wants(&self, resource: &str) -> bool {
        self.resources.is_empty() || self.resources.iter().any(|r| r == resource)
    }
}

/// Role of one promoter resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceReport {
    pub name: String,
    pub target: String,
    pub primary: ResourceRole,
}

/// Status of one plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PluginReport {
    Promoter {
        id: String,
        path: PathBuf,
        resources: Vec<ResourceReport>,
    },
    Prometheus {
        id: String,
        path: PathBuf,
        address: String,
    },
    Umh {
        id: String,
        path: PathBuf,
    },
    Debugger {
        id: String,
        path: PathBuf,
    },
}

/// Whether an HTTP GET against `address` answers successfully in time
pub fn http_get_succeeds(address: &str, timeout: Duration) -> bool {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build();
    let client = match client {
        Ok(client) => client,
        Err(_) => return false,
    };
    client
        .get(format!("http://{}", address))
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .is_ok()
}

/// Reports plugin status to the operator
#[derive(Debug)]
pub struct StatusReporter<'a> {
    console: &'a Console,
    daemon: &'a DaemonControl<'a>,
    resolver: RoleResolver<'a>,
    options: StatusOptions,
}

impl<'a> StatusReporter<'a> {
    pub fn new(
        console: &'a Console,
        daemon: &'a DaemonControl<'a>,
        status: &'a dyn StatusSource,
        options: StatusOptions,
    ) -> Self {
        Self {
            console,
            daemon,
            resolver: RoleResolver::new(status),
            options,
        }
    }

    /// Role of every wanted resource of `promoter`
    fn resource_reports(&self, promoter: &Promoter) -> Vec<ResourceReport> {
        promoter
            .managed_resource_names()
            .into_iter()
            .filter(|name| self.options.wants(name))
            .map(|name| ResourceReport {
                name: name.to_string(),
                target: Promoter::target_identifier(name),
                primary: self.resolver.primary_of(name),
            })
            .collect()
    }

    /// Machine readable report of `plugins`
    pub fn report(&self, plugins: &[PluginDescriptor]) -> Vec<PluginReport> {
        plugins
            .iter()
            .map(|plugin| {
                let id = plugin.id().to_string();
                let path = plugin.source_file().to_path_buf();
                match plugin {
                    PluginDescriptor::Promoter(p) => PluginReport::Promoter {
                        id,
                        path,
                        resources: self.resource_reports(p),
                    },
                    PluginDescriptor::Metrics(m) => PluginReport::Prometheus {
                        id,
                        path,
                        address: m.listen_address.clone(),
                    },
                    PluginDescriptor::UserModeHandler(_) => PluginReport::Umh { id, path },
                    PluginDescriptor::Debugger(_) => PluginReport::Debugger { id, path },
                }
            })
            .collect()
    }

    /// Print the status of every plugin
    pub fn show(&self, plugins: &[PluginDescriptor]) {
        for plugin in plugins {
            if self.options.verbose {
                self.console
                    .println(&format!("{}:", plugin.source_file().display()));
            }
            match plugin {
                PluginDescriptor::Promoter(p) => self.show_promoter(plugin, p),
                PluginDescriptor::Metrics(m) => self.show_metrics(plugin, m),
                PluginDescriptor::UserModeHandler(_) | PluginDescriptor::Debugger(_) => {
                    self.console
                        .println_colored(&format!("{} started", plugin.header()), Color::Green);
                }
            }
        }
    }

    fn show_promoter(&self, plugin: &PluginDescriptor, promoter: &Promoter) {
        self.console.println_colored(&plugin.header(), Color::Green);

        for resource in self.resource_reports(promoter) {
            self.console
                .println(&format!("Most likely active on {}", resource.primary));

            if !self.options.verbose {
                self.daemon.list_dependencies(&resource.target);
                continue;
            }

            self.daemon.show_status(&resource.target);
            self.daemon.show_status(&promote_service(&resource.name));
            let start = promoter
                .resource(&resource.name)
                .map(|spec| spec.start.as_slice())
                .unwrap_or_default();
            for entry in start {
                match unit_for_start_entry(entry, &resource.name) {
                    Some(unit) => self.daemon.show_status(&unit),
                    None => self
                        .console
                        .warn(&format!("could not parse ocf service ('{}')", entry.trim())),
                }
            }
        }
    }

    fn show_metrics(&self, plugin: &PluginDescriptor, metrics: &Metrics) {
        self.console.println_colored(
            &format!("{} listening on {}", plugin.header(), metrics.listen_address),
            Color::Green,
        );
        if self.options.verbose {
            let get = if http_get_succeeds(&metrics.listen_address, HTTP_GET_TIMEOUT) {
                self.console.paint("successful", Color::Green)
            } else {
                self.console.paint("failed", Color::Red)
            };
            self.console.println(&format!("HTTP GET: {}", get));
        }
    }
}
