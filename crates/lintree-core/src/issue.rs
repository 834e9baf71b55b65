//! Issues as reported by the external lint tool.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Source position of an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Position {
    /// Project-relative file path.
    #[serde(default)]
    pub filename: String,
    /// Byte offset within the file.
    #[serde(default)]
    pub offset: u64,
    /// 1-based line number.
    #[serde(default)]
    pub line: u64,
    /// 1-based column number.
    #[serde(default)]
    pub column: u64,
}

/// Inclusive range of lines covered by an issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineRange {
    pub from: u64,
    pub to: u64,
}

/// A single finding. The payload is treated as opaque apart from the fields
/// needed to place it in the tree and to order it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Issue {
    /// Name of the linter that reported the issue.
    pub from_linter: String,
    /// Human-readable message.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub severity: String,
    /// Offending source lines, if the tool captured them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_lines: Option<Vec<String>>,
    /// Suggested fix, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,
    #[serde(default)]
    pub pos: Position,
}

impl Issue {
    /// Create an issue for the given linter at a file position.
    pub fn new(
        linter: impl Into<String>,
        text: impl Into<String>,
        file: impl Into<String>,
        line: u64,
        column: u64,
    ) -> Self {
        Self {
            from_linter: linter.into(),
            text: text.into(),
            pos: Position {
                filename: file.into(),
                line,
                column,
                ..Position::default()
            },
            ..Self::default()
        }
    }

    pub fn file_path(&self) -> &str {
        &self.pos.filename
    }

    pub fn line(&self) -> u64 {
        self.pos.line
    }

    pub fn column(&self) -> u64 {
        self.pos.column
    }

    /// Canonical ordering: file path, line, column, then message.
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        self.file_path()
            .cmp(other.file_path())
            .then(self.line().cmp(&other.line()))
            .then(self.column().cmp(&other.column()))
            .then_with(|| self.text.cmp(&other.text))
    }
}
