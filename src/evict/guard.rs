//! Scoped disable of a snippet
//!
//! Disabling a snippet yields a guard; closing the guard renames the
//! snippet back and reloads the daemon unless autoload is active. If the
//! guard is dropped without being closed (early return, error, panic) the
//! same re-enable runs from `Drop`. An eviction never leaves a snippet
//! disabled unless the process itself dies.

use std::path::{Path, PathBuf};

use super::errors::EvictResult;
use crate::observability::{warn_event, Event};
use crate::snippets::SnippetRepository;
use crate::systemd::DaemonControl;

/// A snippet held in its disabled state
#[derive(Debug)]
pub struct DisabledSnippet<'a> {
    repo: &'a SnippetRepository,
    daemon: &'a DaemonControl<'a>,
    disabled: PathBuf,
    closed: bool,
}

impl<'a> DisabledSnippet<'a> {
    /// Rename `path` to its disabled form
    pub fn disable(
        repo: &'a SnippetRepository,
        daemon: &'a DaemonControl<'a>,
        path: &Path,
    ) -> EvictResult<Self> {
        let disabled = repo.disable_file(path)?;
        Ok(Self {
            repo,
            daemon,
            disabled,
            closed: false,
        })
    }

    /// Current (disabled) location of the snippet
    pub fn disabled_path(&self) -> &Path {
        &self.disabled
    }

    /// Re-enable the snippet, returning its enabled path.
    ///
    /// Failures are returned, not logged; the caller decides how to report them.
    pub fn restore(mut self) -> EvictResult<PathBuf> {
        self.closed = true;
        self.reenable()
    }

    fn reenable(&self) -> EvictResult<PathBuf> {
        let enabled = self.repo.enable_file(&self.disabled)?;
        self.daemon.reload_unless_autoload()?;
        Ok(enabled)
    }
}

impl Drop for DisabledSnippet<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let path = self.disabled.display().to_string();
        warn_event(Event::EvictRollback, &[("path", &path)]);
        if let Err(e) = self.reenable() {
            warn_event(
                Event::EvictRollbackFailed,
                &[("path", &path), ("error", &e.to_string())],
            );
        }
    }
}
