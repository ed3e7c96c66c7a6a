//! TOML documents with located syntax errors

use std::ops::Range;

use serde::de::DeserializeOwned;
use toml_edit::DocumentMut;

use stub_uploader_core::error::StubError;

use crate::ConfigResult;

/// Parse `content` of `file` into `T`. Syntax errors are reported by the
/// `toml_edit` pass, schema errors by serde; both carry line and column.
pub(crate) fn parse_document<T: DeserializeOwned>(file: &str, content: &str) -> ConfigResult<T> {
    check_syntax(file, content)?;
    toml::from_str(content).map_err(|e| located(file, content, e.message(), e.span()))
}

/// Syntax-only pass over `content`
pub(crate) fn check_syntax(file: &str, content: &str) -> ConfigResult<DocumentMut> {
    content
        .parse::<DocumentMut>()
        .map_err(|e| located(file, content, e.message(), e.span()))
}

/// 1-based line and column of a byte offset
pub(crate) fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = content.get(..offset).unwrap_or(content);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

fn located(file: &str, content: &str, message: &str, span: Option<Range<usize>>) -> StubError {
    let (line, column) = span
        .map(|span| line_column(content, span.start))
        .unwrap_or((1, 1));
    StubError::TomlParse {
        file: file.to_string(),
        message: message.trim().to_string(),
        line,
        column,
    }
}
