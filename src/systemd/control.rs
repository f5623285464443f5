//! Daemon control facade
//!
//! Thin wrapper around the service manager. Output of every call is
//! passed through to the operator unparsed. Calls that change state are
//! checked (a non-zero exit is an error); status queries never are.

use std::fmt;
use std::process::Command;

use super::errors::{SystemdError, SystemdResult};
use crate::console::Console;
use crate::observability::{log_event_with_fields, warn_event, Event};

/// The reactor daemon itself
pub const REACTOR_SERVICE: &str = "drbd-reactor.service";

/// Path unit reloading the daemon whenever a snippet changes
pub const REACTOR_RELOAD_PATH: &str = "drbd-reactor-reload.path";

/// Captured result of one service manager call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status 0
    pub success: bool,
    /// Human readable exit status
    pub status: String,
    /// stdout followed by stderr
    pub output: String,
}

impl CommandOutput {
    /// Successful call with the given output
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            status: "exit status: 0".to_string(),
            output: output.into(),
        }
    }
}

/// Backend running service manager actions
pub trait ServiceManager: fmt::Debug {
    /// Run one action (`reload`, `stop`, `status`, ...) with its arguments
    fn run(&self, args: &[&str]) -> SystemdResult<CommandOutput>;

    /// Whether `unit` is currently active
    fn is_active(&self, unit: &str) -> bool;
}

/// `systemctl` based service manager
#[derive(Debug, Clone)]
pub struct Systemctl {
    colors: bool,
}

impl Systemctl {
    /// `colors` is forwarded as `SYSTEMD_COLORS`
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }
}

impl ServiceManager for Systemctl {
    fn run(&self, args: &[&str]) -> SystemdResult<CommandOutput> {
        let command = format!("systemctl {}", args.join(" "));
        let out = Command::new("systemctl")
            .args(args)
            .env("SYSTEMD_COLORS", if self.colors { "1" } else { "0" })
            .output()
            .map_err(|source| SystemdError::Spawn {
                command: command.clone(),
                source,
            })?;

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        Ok(CommandOutput {
            success: out.status.success(),
            status: out.status.to_string(),
            output,
        })
    }

    fn is_active(&self, unit: &str) -> bool {
        Command::new("systemctl")
            .args(["is-active", "-q", unit])
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

/// Reload, restart and stop the daemon and its per-resource targets
#[derive(Debug)]
pub struct DaemonControl<'a> {
    manager: &'a dyn ServiceManager,
    console: &'a Console,
}

impl<'a> DaemonControl<'a> {
    /// Create a facade over `manager`, reporting to `console`
    pub fn new(manager: &'a dyn ServiceManager, console: &'a Console) -> Self {
        Self { manager, console }
    }

    fn invoke(&self, args: &[&str], check: bool) -> SystemdResult<CommandOutput> {
        let command = format!("systemctl {}", args.join(" "));
        log_event_with_fields(Event::ServiceManagerCall, &[("command", &command)]);

        let out = self.manager.run(args)?;
        let text = out.output.trim_end();
        if !text.is_empty() {
            self.console.println(text);
        }

        if !out.success {
            warn_event(
                Event::ServiceManagerFailed,
                &[("command", &command), ("status", &out.status)],
            );
            if check {
                return Err(SystemdError::Failed {
                    command,
                    status: out.status,
                });
            }
        }
        Ok(out)
    }

    /// Reload the reactor daemon
    pub fn reload(&self) -> SystemdResult<()> {
        self.invoke(&["reload", REACTOR_SERVICE], true).map(|_| ())
    }

    /// Reload unless autoload takes care of it; returns whether a reload was issued
    pub fn reload_unless_autoload(&self) -> SystemdResult<bool> {
        if self.autoload_active() {
            log_event_with_fields(Event::ReloadSkipped, &[("unit", REACTOR_RELOAD_PATH)]);
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    /// Restart the reactor daemon
    pub fn restart_service(&self) -> SystemdResult<()> {
        self.invoke(&["restart", REACTOR_SERVICE], true).map(|_| ())
    }

    /// Restart a unit, usually a promoter's services target
    pub fn restart_target(&self, name: &str) -> SystemdResult<()> {
        self.invoke(&["restart", name], true).map(|_| ())
    }

    /// Stop a unit, usually a promoter's services target
    pub fn stop_target(&self, name: &str) -> SystemdResult<()> {
        self.invoke(&["stop", name], true).map(|_| ())
    }

    /// Best-effort `status` of a unit
    pub fn show_status(&self, unit: &str) {
        let _ = self.invoke(&["status", "--no-pager", unit], false);
    }

    /// Best-effort `list-dependencies` of a unit
    pub fn list_dependencies(&self, unit: &str) {
        let _ = self.invoke(&["list-dependencies", "--no-pager", unit], false);
    }

    /// Whether the reload-on-change path unit is active
    pub fn autoload_active(&self) -> bool {
        self.manager.is_active(REACTOR_RELOAD_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
        fail: bool,
        autoload: bool,
    }

    impl ServiceManager for Recorder {
        fn run(&self, args: &[&str]) -> SystemdResult<CommandOutput> {
            self.calls.borrow_mut().push(args.join(" "));
            if self.fail {
                return Ok(CommandOutput {
                    success: false,
                    status: "exit status: 5".into(),
                    output: "Unit not found.".into(),
                });
            }
            Ok(CommandOutput::ok(format!("ran {}", args[0])))
        }

        fn is_active(&self, _unit: &str) -> bool {
            self.autoload
        }
    }

    #[test]
    fn test_reload_surfaces_output() {
        let recorder = Recorder::default();
        let (console, buffer) = Console::capture();
        let daemon = DaemonControl::new(&recorder, &console);

        daemon.reload().unwrap();

        assert_eq!(*recorder.calls.borrow(), vec!["reload drbd-reactor.service"]);
        assert_eq!(buffer.contents(), "ran reload\n");
    }

    #[test]
    fn test_reload_skipped_with_autoload() {
        let recorder = Recorder {
            autoload: true,
            ..Default::default()
        };
        let (console, _) = Console::capture();
        let daemon = DaemonControl::new(&recorder, &console);

        assert!(!daemon.reload_unless_autoload().unwrap());
        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn test_checked_calls_fail() {
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let (console, _) = Console::capture();
        let daemon = DaemonControl::new(&recorder, &console);

        let err = daemon.stop_target("drbd-services@r0.target").unwrap_err();
        assert_eq!(err.command(), "systemctl stop drbd-services@r0.target");
    }

    #[test]
    fn test_status_queries_never_fail() {
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let (console, buffer) = Console::capture();
        let daemon = DaemonControl::new(&recorder, &console);

        daemon.show_status("drbd-services@r0.target");
        daemon.list_dependencies("drbd-services@r0.target");

        assert_eq!(recorder.calls.borrow().len(), 2);
        assert!(buffer.contents().contains("Unit not found."));
    }
}
