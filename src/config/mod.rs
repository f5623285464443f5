//! Main configuration
//!
//! Only the `snippets` entry of the daemon's main TOML file is read: it
//! names the directory holding the plugin snippets this tool manages.

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::fs;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::observability::{log_event_with_fields, Event};

/// Default location of the daemon's main configuration
pub const DEFAULT_CONFIG: &str = "/etc/drbd-reactor.toml";

/// Snippet directory suggested when the main config has none
pub const DEFAULT_SNIPPETS: &str = "/etc/drbd-reactor.d";

/// Extension of enabled snippets
pub const ENABLED_EXTENSION: &str = ".toml";

/// Suffix appended to disabled snippets
pub const DISABLED_SUFFIX: &str = ".disabled";

#[derive(Debug, Deserialize)]
struct MainDocument {
    snippets: Option<String>,
}

/// The parts of the main configuration the tool needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainConfig {
    /// Path of the main configuration file itself
    pub path: PathBuf,
    /// Directory holding the snippets
    pub snippets: PathBuf,
}

impl MainConfig {
    /// Load and validate the main configuration
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.is_file() {
            return Err(ConfigError::MainConfigMissing(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: MainDocument = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

        let snippets = doc
            .snippets
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::SnippetsMissing(path.to_path_buf()))?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("path", &path.display().to_string()),
                ("snippets", &snippets),
            ],
        );

        Ok(Self {
            path: path.to_path_buf(),
            snippets: PathBuf::from(snippets),
        })
    }

    /// Add `snippets = "<DEFAULT_SNIPPETS>"` to the file at `path`.
    ///
    /// The entry goes first: appended after a `[[log]]` table it would
    /// become part of that table.
    pub fn add_snippets_entry(path: &Path) -> ConfigResult<()> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let content = fs::read_to_string(path).map_err(io_err)?;
        fs::write(
            path,
            format!("snippets = \"{}\"\n{}", DEFAULT_SNIPPETS, content),
        )
        .map_err(io_err)?;

        log_event_with_fields(
            Event::SnippetsEntryAdded,
            &[("path", &path.display().to_string())],
        );
        Ok(())
    }

    /// Create the snippet directory (mode 0700) if it does not exist
    pub fn ensure_snippets_dir(&self) -> ConfigResult<()> {
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(&self.snippets)
            .map_err(|source| ConfigError::Io {
                path: self.snippets.clone(),
                source,
            })
    }
}

/// Reduce `foo`, `foo.toml` and `foo.toml.disabled` to `foo`
pub fn normalize_name(name: &str) -> &str {
    let name = name.strip_suffix(DISABLED_SUFFIX).unwrap_or(name);
    name.strip_suffix(ENABLED_EXTENSION).unwrap_or(name)
}
