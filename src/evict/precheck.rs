//! Scope checks run before any eviction
//!
//! Rollback and role polling assume one snippet drives exactly one
//! resource, so a snippet is only evictable if it declares a single
//! plugin and, for a promoter, a single managed resource.

use std::fmt;
use std::path::{Path, PathBuf};

use super::errors::EvictResult;
use crate::plugin::PluginDescriptor;
use crate::snippets;

/// Why a snippet is refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationReason {
    /// The snippet declares this many plugins instead of one
    PluginCount(usize),
    /// The promoter manages this many resources instead of one
    ResourceCount(usize),
}

/// One refused snippet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeViolation {
    pub file: PathBuf,
    pub reason: ViolationReason,
}

impl fmt::Display for ScopeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            ViolationReason::PluginCount(n) => write!(
                f,
                "config file '{}' contains {} plugins, expected exactly one",
                self.file.display(),
                n
            ),
            ViolationReason::ResourceCount(n) => write!(
                f,
                "promoter in config file '{}' is responsible for {} resources, expected exactly one",
                self.file.display(),
                n
            ),
        }
    }
}

fn check_plugins(file: &Path, plugins: &[PluginDescriptor]) -> Option<ScopeViolation> {
    if plugins.len() != 1 {
        return Some(ScopeViolation {
            file: file.to_path_buf(),
            reason: ViolationReason::PluginCount(plugins.len()),
        });
    }
    let managed = plugins[0]
        .as_promoter()
        .map(|p| p.managed_resource_names().len());
    match managed {
        Some(n) if n != 1 => Some(ScopeViolation {
            file: file.to_path_buf(),
            reason: ViolationReason::ResourceCount(n),
        }),
        _ => None,
    }
}

/// Every violation across `files`; empty means all snippets are evictable
pub fn check_scope(files: &[PathBuf]) -> EvictResult<Vec<ScopeViolation>> {
    let mut violations = Vec::new();
    for file in files {
        let plugins = snippets::load(std::slice::from_ref(file))?;
        violations.extend(check_plugins(file, &plugins));
    }
    Ok(violations)
}
