//! Terminal output for the tscn CLI.
//!
//! Status lines are Cargo-style, with a right-aligned coloured verb, and go
//! to stderr. Stdout carries only command results (trees, JSON).

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::check::{Diagnostic, Severity};

const RESET: &str = "\x1b[0m";
const VERB_WIDTH: usize = 12;

/// Text styles understood by [`Printer::paint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Cyan,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "\x1b[1m",
            Style::Dim => "\x1b[2m",
            Style::Red => "\x1b[31m",
            Style::Green => "\x1b[32m",
            Style::Yellow => "\x1b[33m",
            Style::Cyan => "\x1b[36m",
        }
    }
}

/// Terminal-aware status printer. Colour is on when stderr is a terminal.
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    /// Printer that colors output when stderr is a terminal.
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// A printer that never emits escape codes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// e.g. `     Parsing scenes/player.tscn`
    pub fn status(&self, verb: &str, message: &str) {
        self.verb_line(Style::Green, verb, message);
    }

    /// Print a cyan status line.
    pub fn info(&self, verb: &str, message: &str) {
        self.verb_line(Style::Cyan, verb, message);
    }

    /// Print a yellow status line.
    pub fn warning(&self, verb: &str, message: &str) {
        self.verb_line(Style::Yellow, verb, message);
    }

    /// Print a red status line.
    pub fn error(&self, verb: &str, message: &str) {
        self.verb_line(Style::Red, verb, message);
    }

    /// Wrap `text` in the ANSI codes for `style`, if color is on.
    pub fn paint(&self, style: Style, text: &str) -> String {
        if self.color {
            format!("{}{}{}", style.code(), text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Two-line rendering of a check finding.
    pub fn format_diagnostic(&self, scene: &str, diagnostic: &Diagnostic) -> String {
        let style = match diagnostic.severity {
            Severity::Error => Style::Red,
            Severity::Warning => Style::Yellow,
        };
        let location = match diagnostic.line {
            Some(line) => format!("{}:{}", scene, line),
            None => scene.to_string(),
        };

        let mut out = format!(
            "{}[{}]: {}\n  {} {}",
            self.paint(style, &diagnostic.severity.to_string()),
            diagnostic.code,
            diagnostic.message,
            self.paint(Style::Dim, "-->"),
            location
        );
        if let Some(help) = &diagnostic.help {
            out.push_str(&format!("\n  {} {}", self.paint(Style::Cyan, "help:"), help));
        }
        out
    }

    /// Print one check diagnostic for a scene.
    pub fn diagnostic(&self, scene: &str, diagnostic: &Diagnostic) {
        let _ = writeln!(io::stderr().lock(), "{}", self.format_diagnostic(scene, diagnostic));
    }

    fn verb_line(&self, style: Style, verb: &str, message: &str) {
        let mut stderr = io::stderr().lock();
        if self.color {
            let _ = writeln!(
                stderr,
                "{}{}{verb:>VERB_WIDTH$}{RESET} {message}",
                Style::Bold.code(),
                style.code()
            );
        } else {
            let _ = writeln!(stderr, "{verb:>VERB_WIDTH$} {message}");
        }
    }
}

/// `plural(1, "node", "nodes")` gives "1 node".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { pluralized })
}

/// Path relative to the working directory when possible.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));

    match relative {
        Some(r) if r.as_os_str().is_empty() => ".".to_string(),
        Some(r) => r.display().to_string(),
        None => path.display().to_string(),
    }
}
