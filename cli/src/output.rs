//! Styled terminal output.

use console::{Term, style};
use std::fmt::Display;

/// Writes status lines to stdout and the live progress line to stderr.
pub struct Output {
    term: Term,
    progress: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            progress: Term::stderr(),
        }
    }

    /// Print a success message with a green checkmark.
    pub fn success(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("✓").green().bold(), message)),
        );
    }

    /// Print an error message with a red X.
    pub fn error(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("✗").red().bold(), message)),
        );
    }

    pub fn warning(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("⚠").yellow().bold(), message)),
        );
    }

    pub fn info(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("ℹ").blue().bold(), message)),
        );
    }

    pub fn print(&self, message: impl Display) {
        drop(self.term.write_line(&message.to_string()));
    }

    pub fn newline(&self) {
        drop(self.term.write_line(""));
    }

    /// Print a pending file with its type and size.
    pub fn file_item(&self, name: impl Display, details: impl Display, size: impl Display) {
        drop(self.term.write_line(&format!(
            "  {} {} ({}) - {}",
            style("📄").bold(),
            style(name).white().bold(),
            style(details).dim(),
            style(size).cyan()
        )));
    }

    /// Redraw the progress line in place. Only drawn on a terminal.
    pub fn progress(&self, percent: f32) {
        if !self.progress.is_term() {
            return;
        }
        drop(self.progress.clear_line());
        drop(self.progress.write_str(&format!(
            "{} Uploading... {}",
            style("⇡").cyan().bold(),
            style(format!("{percent:>3.0}%")).cyan()
        )));
    }

    pub fn clear_progress(&self) {
        if self.progress.is_term() {
            drop(self.progress.clear_line());
        }
    }
}
