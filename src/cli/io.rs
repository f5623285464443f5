//! Operator interaction for the CLI
//!
//! - Yes/no questions on stdin
//! - Launching `$EDITOR` on a scratch file
//! - Printing snippets through a pager-like viewer
//! - JSON reports on stdout

use std::env;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::Command;

use serde::Serialize;

use super::errors::{CliError, CliResult};
use crate::console::Console;

/// Editor used when `$EDITOR` is not set
pub const DEFAULT_EDITOR: &str = "vi";

/// Viewers tried by `cat`, in order
pub const VIEWERS: [&str; 3] = ["bat", "batcat", "cat"];

/// Source of answers to yes/no questions
pub trait Prompt: fmt::Debug {
    /// Show `question` and read one line; `None` at end of input
    fn read_answer(&self, question: &str) -> io::Result<Option<String>>;
}

/// Prompt on stdout, answers from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn read_answer(&self, question: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{} ", question)?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Ask until the answer is yes or no; an empty answer picks `default`
pub fn ask(prompt: &dyn Prompt, what: &str, default: bool) -> CliResult<bool> {
    let question = format!("{} {}", what, if default { "[Y/n]" } else { "[N/y]" });
    loop {
        let answer = match prompt.read_answer(&question)? {
            Some(answer) => answer.trim().to_lowercase(),
            None => return Ok(default),
        };
        match answer.as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}

/// Interactive editor
pub trait Editor: fmt::Debug {
    /// Edit `path` in place, returning once the editor exits
    fn edit(&self, path: &Path) -> io::Result<()>;
}

/// `$EDITOR`, falling back to `vi`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEditor;

impl Editor for SystemEditor {
    fn edit(&self, path: &Path) -> io::Result<()> {
        let editor = env::var("EDITOR")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        let mut words = editor.split_whitespace();
        let program = words.next().unwrap_or(DEFAULT_EDITOR);

        let status = Command::new(program).args(words).arg(path).status()?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "editor '{}' exited with {}",
                editor, status
            )));
        }
        Ok(())
    }
}

/// Print `path` through the first viewer that runs successfully
pub fn view_file(path: &Path) -> CliResult<()> {
    for viewer in VIEWERS {
        match Command::new(viewer).arg(path).status() {
            Ok(status) if status.success() => return Ok(()),
            Ok(_) => continue,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(CliError::command_failed(format!(
        "could not display '{}' with any of {}",
        path.display(),
        VIEWERS.join(", ")
    )))
}

/// Write a pretty JSON document
pub fn write_json<T: Serialize>(console: &Console, value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    console.println(&json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug)]
    struct Scripted(RefCell<Vec<&'static str>>);

    impl Scripted {
        fn new(answers: &[&'static str]) -> Self {
            let mut answers = answers.to_vec();
            answers.reverse();
            Self(RefCell::new(answers))
        }
    }

    impl Prompt for Scripted {
        fn read_answer(&self, _question: &str) -> io::Result<Option<String>> {
            Ok(self.0.borrow_mut().pop().map(|a| format!("{}\n", a)))
        }
    }

    #[test]
    fn test_ask_default() {
        assert!(!ask(&Scripted::new(&[""]), "Remove?", false).unwrap());
        assert!(ask(&Scripted::new(&[""]), "Add?", true).unwrap());
    }

    #[test]
    fn test_ask_repeats_until_clear_answer() {
        let prompt = Scripted::new(&["maybe", "YES"]);
        assert!(ask(&prompt, "Remove?", false).unwrap());
        assert!(prompt.0.borrow().is_empty());
    }

    #[test]
    fn test_ask_end_of_input_is_default() {
        assert!(!ask(&Scripted::new(&[]), "Remove?", false).unwrap());
    }

    #[test]
    fn test_write_json() {
        let (console, buffer) = Console::capture();
        write_json(&console, &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(buffer.contents(), "{\n  \"a\": 1\n}\n");
    }
}
