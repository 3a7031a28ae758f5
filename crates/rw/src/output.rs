//! Colored terminal output utilities.

use std::path::Path;

use console::{Style, Term};

/// Terminal output formatter. Writes to stderr so stdout carries only
/// rewritten Markdown.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Report a file whose canonical form differs from its content.
    ///
    /// `written` is true when the file was rewritten in place.
    pub(crate) fn file_changed(&self, path: &Path, written: bool) {
        let label = if written {
            self.green.apply_to("Rewrote")
        } else {
            self.yellow.apply_to("Would rewrite")
        };
        let _ = self.term.write_line(&format!("{label} {}", path.display()));
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
