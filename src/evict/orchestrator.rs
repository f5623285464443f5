//! Failover orchestration
//!
//! Drives one resource at a time through the eviction state machine:
//! disable the promoter snippet, reload the daemon, stop the services
//! target, then poll the resource role once per second until a peer
//! takes over or the delay runs out. Whatever happens in between, the
//! snippet is re-enabled before the next resource is looked at.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use super::errors::{EvictError, EvictResult};
use super::guard::DisabledSnippet;
use super::precheck::check_scope;
use super::state::EvictState;
use super::wait::{Interrupt, Sleeper, ThreadSleeper};
use crate::console::{Color, Console};
use crate::drbd::{ResourceRole, RoleResolver, StatusSource};
use crate::observability::{warn_event, Event, ObservationScope};
use crate::plugin::Promoter;
use crate::snippets::{self, SnippetRepository};
use crate::systemd::DaemonControl;

/// Seconds to wait for a peer when `--delay` is not given
pub const DEFAULT_DELAY: u32 = 20;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Eviction settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictSettings {
    /// Seconds to wait for a peer to take over
    pub delay: u32,
    /// Skip the one-plugin, one-resource scope checks
    pub force: bool,
}

impl EvictSettings {
    /// Validated settings; `delay` must be positive
    pub fn new(delay: u32, force: bool) -> EvictResult<Self> {
        if delay == 0 {
            return Err(EvictError::InvalidDelay(delay));
        }
        Ok(Self { delay, force })
    }
}

impl Default for EvictSettings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            force: false,
        }
    }
}

/// How the eviction of one resource ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum EvictOutcome {
    /// The resource was not Primary here; nothing was touched
    NotLocal(ResourceRole),
    /// The named peer became Primary
    TakenOver(String),
    /// The delay ran out with this node still Primary
    StillLocal,
    /// The delay ran out and no Primary is known
    StillUnknown,
    /// The operator interrupted the wait
    Interrupted,
    /// An interruption was pending before anything was changed
    Cancelled,
}

impl EvictOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictOutcome::NotLocal(_) => "not_local",
            EvictOutcome::TakenOver(_) => "taken_over",
            EvictOutcome::StillLocal => "still_local",
            EvictOutcome::StillUnknown => "still_unknown",
            EvictOutcome::Interrupted => "interrupted",
            EvictOutcome::Cancelled => "cancelled",
        }
    }

    /// Whether the snippet was disabled (and re-enabled) for this resource
    pub fn touched_snippet(&self) -> bool {
        !matches!(self, EvictOutcome::NotLocal(_) | EvictOutcome::Cancelled)
    }
}

/// Result of evicting one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvictReport {
    pub resource: String,
    pub source_file: PathBuf,
    pub outcome: EvictOutcome,
}

/// End of the wait loop
enum Waited {
    /// The loop ran to completion; carries the last polled role
    Finished(EvictState, ResourceRole),
    Interrupted(EvictState),
}

/// Evicts promoter resources from the local node
#[derive(Debug)]
pub struct Evictor<'a> {
    repo: &'a SnippetRepository,
    daemon: &'a DaemonControl<'a>,
    console: &'a Console,
    resolver: RoleResolver<'a>,
    interrupt: &'a dyn Interrupt,
    sleeper: &'a dyn Sleeper,
    settings: EvictSettings,
}

impl<'a> Evictor<'a> {
    pub fn new(
        repo: &'a SnippetRepository,
        daemon: &'a DaemonControl<'a>,
        console: &'a Console,
        status: &'a dyn StatusSource,
        interrupt: &'a dyn Interrupt,
        settings: EvictSettings,
    ) -> Self {
        Self {
            repo,
            daemon,
            console,
            resolver: RoleResolver::new(status),
            interrupt,
            sleeper: &ThreadSleeper,
            settings,
        }
    }

    /// Replace the one-second blocking sleep
    pub fn with_sleeper(mut self, sleeper: &'a dyn Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Evict every promoter resource configured in `files`.
    ///
    /// Unless forced, all files are checked first and nothing is changed
    /// if any of them declares more than one plugin or more than one
    /// managed resource.
    pub fn run(&self, files: &[PathBuf]) -> EvictResult<Vec<EvictReport>> {
        if !self.settings.force {
            let violations = check_scope(files)?;
            if !violations.is_empty() {
                for violation in &violations {
                    self.console.warn(&violation.to_string());
                    warn_event(
                        Event::EvictRefused,
                        &[
                            ("path", &violation.file.display().to_string()),
                            ("reason", &violation.to_string()),
                        ],
                    );
                }
                return Err(EvictError::Scope(violations));
            }
        }

        let plugins = snippets::load(files)?;
        let mut reports = Vec::new();
        for promoter in plugins.iter().filter_map(|p| p.as_promoter()) {
            for resource in promoter.managed_resource_names() {
                let outcome = self.evict_resource(promoter, resource)?;
                reports.push(EvictReport {
                    resource: resource.to_string(),
                    source_file: promoter.info.source_file.clone(),
                    outcome,
                });
            }
        }
        Ok(reports)
    }

    fn evict_resource(&self, promoter: &Promoter, resource: &str) -> EvictResult<EvictOutcome> {
        self.console
            .println_colored(&format!("Evicting {}", resource), Color::Green);

        let role = self.resolver.primary_of(resource);
        match &role {
            ResourceRole::ThisNode => {}
            ResourceRole::Unknown => {
                self.console.println(&format!(
                    "Sorry, resource state for '{}' unknown, ignoring",
                    resource
                ));
                return Ok(EvictOutcome::NotLocal(role));
            }
            ResourceRole::Peer(peer) => {
                self.console.println(&format!(
                    "Active on '{}', nothing to do on this node, ignoring",
                    peer
                ));
                return Ok(EvictOutcome::NotLocal(role));
            }
        }

        if self.interrupt.is_interrupted() {
            self.console.println("interrupted, nothing changed");
            warn_event(
                Event::EvictInterrupted,
                &[("resource", resource), ("phase", "before_disable")],
            );
            return Ok(EvictOutcome::Cancelled);
        }

        let source = &promoter.info.source_file;
        if source.as_os_str().is_empty() {
            return Err(EvictError::NoSourceFile(resource.to_string()));
        }

        let target = Promoter::target_identifier(resource);
        let scope =
            ObservationScope::with_fields("EVICT", &[("resource", resource), ("target", &target)]);

        let state = EvictState::default().begin_disable()?;
        let guard = match DisabledSnippet::disable(self.repo, self.daemon, source) {
            Ok(guard) => guard,
            Err(e) => {
                scope.fail(&e.to_string());
                return Err(e);
            }
        };

        // signals are caught only while the snippet is held disabled
        let waited = match self.interrupt.catch() {
            Ok(signals) => {
                let waited = self.stop_and_wait(resource, &target, state);
                drop(signals);
                waited
            }
            Err(e) => Err(EvictError::Signals(e)),
        };
        let interrupted = self.interrupt.is_interrupted();
        self.interrupt.clear();

        let (state, outcome) = match waited {
            Ok(Waited::Finished(state, role)) => {
                let state = state.classify(&role)?;
                (state, self.report_outcome(&role))
            }
            Ok(Waited::Interrupted(state)) => {
                self.console.println("");
                self.console.println("interrupted");
                warn_event(
                    Event::EvictInterrupted,
                    &[("resource", resource), ("phase", "wait")],
                );
                (state, EvictOutcome::Interrupted)
            }
            Err(e) => {
                if interrupted {
                    warn_event(
                        Event::EvictInterrupted,
                        &[("resource", resource), ("phase", "stop")],
                    );
                }
                scope.fail(&e.to_string());
                self.console.println("Re-enabling the config");
                // the failed step is reported, a failed re-enable only logged and shown
                let _ = self.restore(guard, resource);
                return Err(e);
            }
        };

        let state = state.begin_reenable()?;
        self.console.println("Re-enabling the config");
        if let Err(e) = self.restore(guard, resource) {
            scope.fail(&e.to_string());
            return Err(e);
        }
        state.finish()?;

        scope.complete_with_fields(&[("outcome", outcome.as_str())]);
        Ok(outcome)
    }

    fn restore(&self, guard: DisabledSnippet<'_>, resource: &str) -> EvictResult<()> {
        let disabled = guard.disabled_path().display().to_string();
        match guard.restore() {
            Ok(_) => Ok(()),
            Err(e) => {
                warn_event(
                    Event::EvictRollbackFailed,
                    &[
                        ("error", &e.to_string()),
                        ("path", &disabled),
                        ("resource", resource),
                    ],
                );
                self.console.println(&format!(
                    "Re-enabling the config failed: {}, run the \"enable\" subcommand for {}",
                    e, disabled
                ));
                Err(e)
            }
        }
    }

    /// Reload (ignoring autoload, the stop below must see the snippet
    /// gone), stop the target, then count down while polling the role.
    fn stop_and_wait(&self, resource: &str, target: &str, state: EvictState) -> EvictResult<Waited> {
        self.daemon.reload()?;
        self.daemon.stop_target(target)?;

        let mut state = state.begin_wait(self.settings.delay)?;
        let mut role = ResourceRole::ThisNode;
        let mut needs_newline = false;

        for remaining in (0..=self.settings.delay).rev() {
            if self.interrupt.is_interrupted() {
                return Ok(Waited::Interrupted(state));
            }
            role = self.resolver.primary_of(resource);
            if role.is_peer() {
                break;
            }

            if remaining == 0 {
                self.console.print("0");
            } else {
                self.console.print(&format!("{}..", remaining));
            }
            needs_newline = true;

            if remaining > 0 {
                self.sleeper.sleep(POLL_INTERVAL);
                if self.interrupt.is_interrupted() {
                    return Ok(Waited::Interrupted(state));
                }
                state = state.tick()?;
            }
        }

        if needs_newline {
            self.console.println("");
        }
        Ok(Waited::Finished(state, role))
    }

    fn report_outcome(&self, role: &ResourceRole) -> EvictOutcome {
        match role {
            ResourceRole::Unknown => {
                self.console.println(
                    "Unfortunately no other node took over, resource in unknown state",
                );
                EvictOutcome::StillUnknown
            }
            ResourceRole::ThisNode => {
                self.console.println(
                    "Unfortunately no other node took over, local node still DRBD Primary",
                );
                EvictOutcome::StillLocal
            }
            ResourceRole::Peer(peer) => {
                self.console.println(&format!("Node '{}' took over", peer));
                EvictOutcome::TakenOver(peer.clone())
            }
        }
    }
}
