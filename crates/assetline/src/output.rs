//! Colored terminal output utilities.

use std::path::Path;

use assetline_pipeline::SkipReason;
use console::{Style, Term};

/// Terminal output for the build command.
///
/// Status lines go to stderr; compiled CSS printed without `--out-dir` goes
/// to stdout.
pub(crate) struct Output {
    status: Term,
    css: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            css: Term::stdout(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Plain status line.
    pub(crate) fn status(&self, msg: &str) {
        let _ = self.status.write_line(msg);
    }

    /// A stylesheet written to `dest` (green).
    pub(crate) fn built(&self, source: &Path, dest: &Path) {
        let line = format!("Built {} -> {}", source.display(), dest.display());
        let _ = self.status.write_line(&self.green.apply_to(line).to_string());
    }

    /// A stylesheet that was not built on its own (yellow).
    pub(crate) fn skipped(&self, source: &Path, reason: SkipReason) {
        let line = format!("Skipped {}: {reason}", source.display());
        let _ = self.status.write_line(&self.yellow.apply_to(line).to_string());
    }

    /// An error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.status.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Compiled CSS, uncolored.
    pub(crate) fn css(&self, css: &str) {
        let _ = self.css.write_line(css);
    }
}
