//! Typed plugin descriptors
//!
//! A snippet declares zero or more plugins, grouped by kind:
//!
//! ```toml
//! [[promoter]]
//! id = "web"
//! [promoter.resources.web]
//! start = ["srv-web.mount", "nginx.service"]
//! ```
//!
//! Each declared entry becomes one descriptor tagged with the file it came
//! from. Kinds are visited in a fixed order (promoter, prometheus, umh,
//! debugger) and entries keep their declaration order within a kind.
//! Unknown kinds are ignored. Descriptors are read-only views built fresh
//! for every listing.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::errors::{PluginError, PluginResult};
use crate::systemd;

/// Id used when a plugin entry does not declare one
pub const NO_ID: &str = "<none>";

/// Default listen address of the metrics endpoint
pub const DEFAULT_METRICS_ADDRESS: &str = "0.0.0.0:9942";

/// The plugin kinds a snippet may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PluginKind {
    Promoter,
    Prometheus,
    Umh,
    Debugger,
}

impl PluginKind {
    /// All kinds, in the order descriptors are produced
    pub const ALL: [PluginKind; 4] = [
        PluginKind::Promoter,
        PluginKind::Prometheus,
        PluginKind::Umh,
        PluginKind::Debugger,
    ];

    /// Table name of the kind inside a snippet
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Promoter => "promoter",
            PluginKind::Prometheus => "prometheus",
            PluginKind::Umh => "umh",
            PluginKind::Debugger => "debugger",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a promoter starts and stops the services of a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runner {
    /// Services are grouped in a generated systemd target
    #[default]
    Systemd,
    /// Services are started by shell commands; there is no target
    Shell,
}

/// Configuration of one resource managed by a promoter
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceSpec {
    #[serde(default)]
    pub runner: Runner,
    /// Units started in order; entries may be `ocf:<vendor>:<agent> <instance> ...`
    #[serde(default)]
    pub start: Vec<String>,
}

/// Identity shared by every descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub id: String,
    /// Empty for descriptors not backed by a file
    pub source_file: PathBuf,
}

/// A promoter and the resources it manages, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promoter {
    pub info: PluginInfo,
    pub resources: Vec<(String, ResourceSpec)>,
}

impl Promoter {
    /// Resources with a systemd runner. Shell runners have no target to
    /// query or stop, so they are never managed by this tool.
    pub fn managed_resource_names(&self) -> Vec<&str> {
        self.resources
            .iter()
            .filter(|(_, spec)| spec.runner == Runner::Systemd)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Services target of `resource`
    pub fn target_identifier(resource: &str) -> String {
        systemd::services_target(resource)
    }

    /// Configuration of a declared resource
    pub fn resource(&self, name: &str) -> Option<&ResourceSpec> {
        self.resources
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }
}

/// Prometheus metrics endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub info: PluginInfo,
    pub listen_address: String,
}

/// One declared plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginDescriptor {
    Promoter(Promoter),
    Metrics(Metrics),
    UserModeHandler(PluginInfo),
    Debugger(PluginInfo),
}

#[derive(Debug, Deserialize)]
struct PromoterEntry {
    id: Option<String>,
    #[serde(default)]
    resources: toml::Table,
}

#[derive(Debug, Deserialize)]
struct MetricsEntry {
    id: Option<String>,
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlainEntry {
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SnippetDocument {
    #[serde(default)]
    promoter: Vec<PromoterEntry>,
    #[serde(default)]
    prometheus: Vec<MetricsEntry>,
    #[serde(default)]
    umh: Vec<PlainEntry>,
    #[serde(default)]
    debugger: Vec<PlainEntry>,
}

fn info(id: Option<String>, source_file: &Path) -> PluginInfo {
    PluginInfo {
        id: id.unwrap_or_else(|| NO_ID.to_string()),
        source_file: source_file.to_path_buf(),
    }
}

impl PluginDescriptor {
    /// Build the descriptors declared in `content`, tagged with `source_file`
    pub fn from_toml(content: &str, source_file: &Path) -> PluginResult<Vec<PluginDescriptor>> {
        let doc: SnippetDocument = toml::from_str(content).map_err(|e| PluginError::Parse {
            path: source_file.to_path_buf(),
            message: e.message().to_string(),
        })?;

        let mut plugins = Vec::new();

        for entry in doc.promoter {
            let mut resources = Vec::with_capacity(entry.resources.len());
            for (name, value) in entry.resources {
                let spec: ResourceSpec =
                    value
                        .try_into()
                        .map_err(|e: toml::de::Error| PluginError::InvalidEntry {
                            path: source_file.to_path_buf(),
                            kind: PluginKind::Promoter.as_str(),
                            message: format!("resource '{}': {}", name, e.message()),
                        })?;
                resources.push((name, spec));
            }
            plugins.push(PluginDescriptor::Promoter(Promoter {
                info: info(entry.id, source_file),
                resources,
            }));
        }

        for entry in doc.prometheus {
            plugins.push(PluginDescriptor::Metrics(Metrics {
                info: info(entry.id, source_file),
                listen_address: entry
                    .address
                    .unwrap_or_else(|| DEFAULT_METRICS_ADDRESS.to_string()),
            }));
        }

        for entry in doc.umh {
            plugins.push(PluginDescriptor::UserModeHandler(info(entry.id, source_file)));
        }

        for entry in doc.debugger {
            plugins.push(PluginDescriptor::Debugger(info(entry.id, source_file)));
        }

        Ok(plugins)
    }

    /// Kind of this plugin
    pub fn kind(&self) -> PluginKind {
        match self {
            PluginDescriptor::Promoter(_) => PluginKind::Promoter,
            PluginDescriptor::Metrics(_) => PluginKind::Prometheus,
            PluginDescriptor::UserModeHandler(_) => PluginKind::Umh,
            PluginDescriptor::Debugger(_) => PluginKind::Debugger,
        }
    }

    fn info(&self) -> &PluginInfo {
        match self {
            PluginDescriptor::Promoter(p) => &p.info,
            PluginDescriptor::Metrics(m) => &m.info,
            PluginDescriptor::UserModeHandler(info) | PluginDescriptor::Debugger(info) => info,
        }
    }

    /// Declared id, or `<none>`
    pub fn id(&self) -> &str {
        &self.info().id
    }

    /// File the plugin was declared in
    pub fn source_file(&self) -> &Path {
        &self.info().source_file
    }

    /// Human readable one-line header
    pub fn header(&self) -> String {
        let name = match self {
            PluginDescriptor::Promoter(_) => "Promoter",
            PluginDescriptor::Metrics(_) => "Prometheus",
            PluginDescriptor::UserModeHandler(_) => "UMH",
            PluginDescriptor::Debugger(_) => "Debugger",
        };
        format!("{} (ID: '{}')", name, self.id())
    }

    /// Services targets of every managed resource; empty for non-promoters
    pub fn targets(&self) -> Vec<String> {
        match self {
            PluginDescriptor::Promoter(p) => p
                .managed_resource_names()
                .into_iter()
                .map(Promoter::target_identifier)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The promoter, if this is one
    pub fn as_promoter(&self) -> Option<&Promoter> {
        match self {
            PluginDescriptor::Promoter(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Vec<PluginDescriptor> {
        PluginDescriptor::from_toml(content, Path::new("/etc/drbd-reactor.d/test.toml")).unwrap()
    }

    #[test]
    fn test_kinds_in_fixed_order() {
        let plugins = parse(
            r#"
            [[debugger]]
            id = "dbg"
            [[umh]]
            id = "hooks"
            [[prometheus]]
            id = "metrics"
            [[promoter]]
            id = "web"
            "#,
        );
        let kinds: Vec<_> = plugins.iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, PluginKind::ALL.to_vec());
    }

    #[test]
    fn test_declaration_order_within_kind() {
        let plugins = parse(
            r#"
            [[umh]]
            id = "u1"
            [[debugger]]
            id = "d1"
            [[promoter]]
            id = "p1"
            [[prometheus]]
            id = "m1"
            [[umh]]
            id = "u2"
            [[promoter]]
            id = "p2"
            [[debugger]]
            id = "d2"
            [[prometheus]]
            id = "m2"
            [[umh]]
            id = "u3"
            [[promoter]]
            id = "p3"
            "#,
        );
        assert_eq!(plugins.len(), 10);

        for kind in PluginKind::ALL {
            let ids: Vec<_> = plugins
                .iter()
                .filter(|p| p.kind() == kind)
                .map(|p| p.id())
                .collect();
            let expected: &[&str] = match kind {
                PluginKind::Promoter => &["p1", "p2", "p3"],
                PluginKind::Prometheus => &["m1", "m2"],
                PluginKind::Umh => &["u1", "u2", "u3"],
                PluginKind::Debugger => &["d1", "d2"],
            };
            assert_eq!(ids, expected, "order of {} plugins", kind);
        }

        let ids: Vec<_> = plugins.iter().map(|p| p.id()).collect();
        assert_eq!(
            ids,
            vec!["p1", "p2", "p3", "m1", "m2", "u1", "u2", "u3", "d1", "d2"]
        );
    }

    #[test]
    fn test_defaults() {
        let plugins = parse("[[prometheus]]\n[[debugger]]\n");
        assert_eq!(plugins[0].id(), NO_ID);
        match &plugins[0] {
            PluginDescriptor::Metrics(m) => assert_eq!(m.listen_address, DEFAULT_METRICS_ADDRESS),
            other => panic!("expected metrics, got {:?}", other),
        }
        assert_eq!(plugins[1].header(), "Debugger (ID: '<none>')");
    }

    #[test]
    fn test_unknown_kinds_ignored() {
        let plugins = parse(
            r#"
            snippets = "/etc/drbd-reactor.d"
            [[agentx]]
            address = "localhost:705"
            [[log]]
            level = "info"
            "#,
        );
        assert!(plugins.is_empty());
    }

    #[test]
    fn test_promoter_resources() {
        let plugins = parse(
            r#"
            [[promoter]]
            id = "mixed"
            [promoter.resources.zeta]
            start = ["a.service"]
            [promoter.resources.alpha]
            runner = "shell"
            start = ["/usr/bin/start-it"]
            [promoter.resources.mid]
            start = ["ocf:heartbeat:IPaddr2 vip ip=10.0.0.1", "b.service"]
            "#,
        );
        let promoter = plugins[0].as_promoter().unwrap();

        let names: Vec<_> = promoter.resources.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(promoter.managed_resource_names(), vec!["zeta", "mid"]);
        assert_eq!(
            plugins[0].targets(),
            vec!["drbd-services@zeta.target", "drbd-services@mid.target"]
        );
        assert_eq!(promoter.resource("alpha").unwrap().runner, Runner::Shell);
        assert_eq!(promoter.resource("mid").unwrap().start.len(), 2);
    }

    #[test]
    fn test_source_file_tagged() {
        let plugins = parse("[[promoter]]\nid = \"a\"\n[[umh]]\n");
        for p in &plugins {
            assert_eq!(p.source_file(), Path::new("/etc/drbd-reactor.d/test.toml"));
        }
    }

    #[test]
    fn test_bad_runner_rejected() {
        let err = PluginDescriptor::from_toml(
            "[[promoter]]\n[promoter.resources.r0]\nrunner = \"cron\"\n",
            Path::new("x.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, PluginError::InvalidEntry { .. }));
    }

    #[test]
    fn test_malformed_document() {
        let err = PluginDescriptor::from_toml("[[promoter]\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, PluginError::Parse { .. }));
    }

    #[test]
    fn test_headers() {
        let plugins = parse(
            "[[promoter]]\nid = \"p\"\n[[prometheus]]\nid = \"m\"\n[[umh]]\nid = \"u\"\n",
        );
        assert_eq!(plugins[0].header(), "Promoter (ID: 'p')");
        assert_eq!(plugins[1].header(), "Prometheus (ID: 'm')");
        assert_eq!(plugins[2].header(), "UMH (ID: 'u')");
    }
}
