//! Terminal output formatting.
//!
//! Results go to stdout and hints to stderr, so the output of `order` and
//! `plan --json` can be piped into another tool.

pub mod colors;
pub mod errors;

use colors::ColorSupport;

/// Formats command results and hints for the terminal
pub struct OutputHandler {
    colors: ColorSupport,
}

impl OutputHandler {
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    /// Result line without decoration
    pub fn plain(&self, line: &str) {
        println!("{}", line);
    }

    /// Dimmed hint on stderr
    pub fn info(&self, hint: &str) {
        eprintln!("{}", self.colors.dim(hint));
    }

    pub fn success(&self, line: &str) {
        println!("{} {}", self.colors.green("✓"), line);
    }

    /// Result line that needs attention, e.g. a skipped upload
    pub fn warn(&self, line: &str) {
        println!("{} {}", self.colors.yellow("⚠"), line);
    }

    pub fn error(&self, line: &str) {
        eprintln!("{} {}", self.colors.red("✗"), line);
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
