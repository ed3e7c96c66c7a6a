//! Rendering of `StubError`s for the terminal
//!
//! A verification failure prints its message verbatim, then the failed
//! rule, the operator hint and any underlying causes, one per line.

use std::error::Error;
use std::fmt::Write;

use stub_uploader_core::error::StubError;

use super::colors::ColorSupport;

pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    #[cfg(test)]
    fn plain() -> Self {
        Self {
            colors: ColorSupport::with_enabled(false),
        }
    }

    /// Full report for `error`, newline terminated
    pub fn format_error(&self, error: &StubError) -> String {
        let mut report = format!("{}\n", self.format_simple(&error.to_string()));

        if let StubError::TomlParse { file, line, column, .. } = error {
            report.push_str(&self.format_location(file, *line, *column));
            report.push('\n');
        }
        if let Some(rule) = error.requires_rule() {
            self.labelled(&mut report, "rule", &rule.to_string());
        }
        if let Some(hint) = error.suggestion() {
            self.labelled(&mut report, "help", hint);
        }

        let mut cause = error.source();
        while let Some(err) = cause {
            self.labelled(&mut report, "caused by", &err.to_string());
            cause = err.source();
        }

        report
    }

    pub fn format_simple(&self, message: &str) -> String {
        format!("{}: {}", self.colors.red("error"), message)
    }

    /// `--> file:line:column`
    pub fn format_location(&self, file: &str, line: usize, column: usize) -> String {
        format!("{} {}:{}:{}", self.colors.dim("-->"), file, line, column)
    }

    fn labelled(&self, report: &mut String, label: &str, text: &str) {
        // Writing to a String cannot fail
        let _ = writeln!(report, "{}: {}", self.colors.dim(label), text);
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
