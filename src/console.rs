//! Operator-facing output
//!
//! The console carries the color decision explicitly instead of a
//! process-wide toggle. Everything the operator is meant to read goes
//! through here; diagnostics go through `observability`.

use std::cell::RefCell;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;

/// Terminal colors used by the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
}

impl Color {
    fn code(&self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
        }
    }
}

/// `--color` choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolve `auto` against whether stdout is a terminal
    pub fn enabled(&self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        }
    }
}

/// Shared in-memory sink, used to capture console output in tests
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Operator output with an explicit color setting
pub struct Console {
    color: bool,
    out: RefCell<Box<dyn Write>>,
    err: RefCell<Box<dyn Write>>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").field("color", &self.color).finish()
    }
}

impl Console {
    /// Console writing to stdout
    pub fn stdout(color: bool) -> Self {
        Self::with_writer(color, Box::new(io::stdout()))
    }

    /// Console writing to an arbitrary sink, warnings still go to stderr
    pub fn with_writer(color: bool, out: Box<dyn Write>) -> Self {
        Self::with_writers(color, out, Box::new(io::stderr()))
    }

    /// Console with separate sinks for output and warnings
    pub fn with_writers(color: bool, out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        Self {
            color,
            out: RefCell::new(out),
            err: RefCell::new(err),
        }
    }

    /// Uncolored console capturing output and warnings into one buffer
    pub fn capture() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let console = Self::with_writers(
            false,
            Box::new(buffer.clone()),
            Box::new(buffer.clone()),
        );
        (console, buffer)
    }

    /// Whether ANSI colors are emitted
    pub fn colors(&self) -> bool {
        self.color
    }

    /// Wrap `text` in the given color if colors are enabled
    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            format!("\x1b[1;{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Write without a newline and flush, for progress output
    pub fn print(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    /// Write a line
    pub fn println(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }

    /// Write a colored line
    pub fn println_colored(&self, text: &str, color: Color) {
        self.println(&self.paint(text, color));
    }

    /// Non-fatal warning on stderr
    pub fn warn(&self, text: &str) {
        let mut err = self.err.borrow_mut();
        let _ = writeln!(err, "{} {}", self.paint("WARN:", Color::Yellow), text);
        let _ = err.flush();
    }

    /// Informational note
    pub fn info(&self, text: &str) {
        self.println(&format!("{} {}", self.paint("INFO:", Color::Green), text));
    }
}
