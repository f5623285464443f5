//! Test support for drbd-reactorctl
//!
//! - Scratch main config and snippet directory
//! - In-process fakes for drbdsetup, systemctl, sleeping, the editor and
//!   the operator's answers

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use reactorctl::cli::{Editor, Prompt};
use reactorctl::config::MainConfig;
use reactorctl::drbd::{StatusError, StatusResult, StatusSource};
use reactorctl::evict::{InterruptFlag, Sleeper};
use reactorctl::snippets::SnippetRepository;
use reactorctl::systemd::{CommandOutput, ServiceManager, SystemdResult};

// =============================================================================
// SCRATCH CONFIGURATION
// =============================================================================

/// Main config plus snippet directory in a temp dir
pub struct Fixture {
    pub temp: TempDir,
    pub config: MainConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let snippets = temp.path().join("drbd-reactor.d");
        let path = temp.path().join("drbd-reactor.toml");
        fs::write(&path, format!("snippets = \"{}\"\n", snippets.display())).unwrap();

        let config = MainConfig::load(&path).unwrap();
        config.ensure_snippets_dir().unwrap();
        Self { temp, config }
    }

    pub fn repo(&self) -> SnippetRepository {
        SnippetRepository::from_config(&self.config)
    }

    pub fn snippet(&self, file_name: &str) -> PathBuf {
        self.config.snippets.join(file_name)
    }

    pub fn write_snippet(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.snippet(file_name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read_snippet(&self, file_name: &str) -> String {
        fs::read_to_string(self.snippet(file_name)).unwrap()
    }
}

/// Snippet with one promoter managing `resource`
pub fn promoter_snippet(id: &str, resource: &str) -> String {
    format!(
        "[[promoter]]\nid = \"{}\"\n[promoter.resources.{}]\nstart = [\"{}.mount\", \"{}.service\"]\n",
        id, resource, resource, resource
    )
}

// =============================================================================
// DRBD STATUS
// =============================================================================

/// One scripted status answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// This node is Primary
    Local,
    /// The named peer is Primary
    Peer(&'static str),
    /// Nobody is Primary
    Secondary,
    /// The status query fails
    Fails,
}

/// Answers status queries from a script; the last reply repeats
#[derive(Debug)]
pub struct ScriptedStatus {
    replies: Vec<Reply>,
    pub calls: Cell<usize>,
}

impl ScriptedStatus {
    pub fn new(replies: Vec<Reply>) -> Self {
        assert!(!replies.is_empty());
        Self {
            replies,
            calls: Cell::new(0),
        }
    }

    pub fn always(reply: Reply) -> Self {
        Self::new(vec![reply])
    }
}

impl StatusSource for ScriptedStatus {
    fn status_json(&self, resource: &str) -> StatusResult<String> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        let reply = &self.replies[n.min(self.replies.len() - 1)];

        let (role, peer_role, peer) = match reply {
            Reply::Local => ("Primary", "Secondary", "beta"),
            Reply::Peer(peer) => ("Secondary", "Primary", *peer),
            Reply::Secondary => ("Secondary", "Secondary", "beta"),
            Reply::Fails => {
                return Err(StatusError::Failed {
                    resource: resource.to_string(),
                    status: "exit status: 10".to_string(),
                })
            }
        };
        Ok(format!(
            r#"[{{"name":"{}","role":"{}","connections":[{{"name":"{}","peer-role":"{}"}}]}}]"#,
            resource, role, peer, peer_role
        ))
    }
}

/// Raises an interrupt flag while answering the n-th query (1-based)
#[derive(Debug)]
pub struct InterruptingStatus {
    pub inner: ScriptedStatus,
    at: usize,
    flag: InterruptFlag,
}

impl InterruptingStatus {
    pub fn new(inner: ScriptedStatus, at: usize, flag: &InterruptFlag) -> Self {
        Self {
            inner,
            at,
            flag: flag.clone(),
        }
    }
}

impl StatusSource for InterruptingStatus {
    fn status_json(&self, resource: &str) -> StatusResult<String> {
        if self.inner.calls.get() + 1 == self.at {
            self.flag.raise();
        }
        self.inner.status_json(resource)
    }
}

// =============================================================================
// SYSTEMCTL
// =============================================================================

/// Records every service manager call
#[derive(Debug, Default)]
pub struct RecordingManager {
    pub calls: RefCell<Vec<String>>,
    pub autoload: bool,
    /// Calls starting with this prefix exit non-zero
    pub fail_prefix: Option<&'static str>,
}

impl RecordingManager {
    pub fn with_autoload() -> Self {
        Self {
            autoload: true,
            ..Default::default()
        }
    }

    pub fn failing(prefix: &'static str) -> Self {
        Self {
            fail_prefix: Some(prefix),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ServiceManager for RecordingManager {
    fn run(&self, args: &[&str]) -> SystemdResult<CommandOutput> {
        let call = args.join(" ");
        self.calls.borrow_mut().push(call.clone());
        match self.fail_prefix {
            Some(prefix) if call.starts_with(prefix) => Ok(CommandOutput {
                success: false,
                status: "exit status: 5".to_string(),
                output: format!("Failed to {}", call),
            }),
            _ => Ok(CommandOutput::ok("")),
        }
    }

    fn is_active(&self, _unit: &str) -> bool {
        self.autoload
    }
}

// =============================================================================
// SLEEPING AND INTERRUPTION
// =============================================================================

/// Counts sleeps, optionally raising an interrupt and watching a file
#[derive(Debug, Default)]
pub struct CountingSleeper {
    pub sleeps: Cell<usize>,
    /// Raise this flag during the n-th sleep (1-based)
    pub interrupt_at: Option<(usize, InterruptFlag)>,
    /// Record whether this file exists during every sleep
    pub watch: Option<PathBuf>,
    pub seen: RefCell<Vec<bool>>,
}

impl CountingSleeper {
    pub fn interrupting(at: usize, flag: &InterruptFlag) -> Self {
        Self {
            interrupt_at: Some((at, flag.clone())),
            ..Default::default()
        }
    }

    pub fn watching(path: &Path) -> Self {
        Self {
            watch: Some(path.to_path_buf()),
            ..Default::default()
        }
    }
}

impl Sleeper for CountingSleeper {
    fn sleep(&self, _duration: Duration) {
        let n = self.sleeps.get() + 1;
        self.sleeps.set(n);
        if let Some((at, flag)) = &self.interrupt_at {
            if *at == n {
                flag.raise();
            }
        }
        if let Some(path) = &self.watch {
            self.seen.borrow_mut().push(path.exists());
        }
    }
}

// =============================================================================
// OPERATOR
// =============================================================================

/// Editor that replaces the file content with scripted versions
#[derive(Debug, Default)]
pub struct ScriptedEditor {
    versions: RefCell<Vec<String>>,
    /// Content found in the file on every launch
    pub seen: RefCell<Vec<String>>,
}

impl ScriptedEditor {
    pub fn new(versions: &[&str]) -> Self {
        Self {
            versions: RefCell::new(versions.iter().rev().map(|v| v.to_string()).collect()),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl Editor for ScriptedEditor {
    fn edit(&self, path: &Path) -> io::Result<()> {
        self.seen.borrow_mut().push(fs::read_to_string(path)?);
        match self.versions.borrow_mut().pop() {
            Some(version) => fs::write(path, version),
            None => Ok(()),
        }
    }
}

/// Answers every question the same way
#[derive(Debug)]
pub struct FixedAnswer(pub &'static str);

impl Prompt for FixedAnswer {
    fn read_answer(&self, _question: &str) -> io::Result<Option<String>> {
        Ok(Some(format!("{}\n", self.0)))
    }
}
