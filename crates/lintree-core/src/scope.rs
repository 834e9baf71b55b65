//! Units of work handed to the external lint tool.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::recursive_label;

/// Whether an invocation covers a whole subtree or only a directory's files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    /// The directory and everything beneath it.
    Recursive,
    /// Only the files directly in the directory.
    SelfOnly,
}

/// The unit of work of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// Project-relative directory path.
    pub path: String,
    pub kind: ScopeKind,
}

impl Scope {
    pub fn recursive(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ScopeKind::Recursive,
        }
    }

    pub fn self_only(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ScopeKind::SelfOnly,
        }
    }

    /// Package pattern passed to the tool, relative to the project root.
    pub fn target(&self) -> String {
        let base = if self.path == "." {
            ".".to_string()
        } else {
            format!("./{}", self.path)
        };
        match self.kind {
            ScopeKind::Recursive => recursive_label(&base),
            ScopeKind::SelfOnly => base,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ScopeKind::Recursive => f.write_str(&recursive_label(&self.path)),
            ScopeKind::SelfOnly => f.write_str(&self.path),
        }
    }
}

/// Why a running invocation was stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptCause {
    /// Host memory use crossed the watchdog threshold.
    MemoryPressure,
    /// The program received a termination signal.
    Signal(String),
}

impl fmt::Display for InterruptCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterruptCause::MemoryPressure => f.write_str("memory pressure"),
            InterruptCause::Signal(name) => write!(f, "signal {name}"),
        }
    }
}

/// Outcome of one invocation, as recorded on the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationStatus {
    Completed,
    Interrupted(InterruptCause),
}

/// One entry in a project's invocation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub scope: Scope,
    pub status: InvocationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_target() {
        assert_eq!(Scope::recursive(".").target(), "./...");
        assert_eq!(Scope::self_only(".").target(), ".");
        assert_eq!(Scope::recursive("foo/dir").target(), "./foo/dir/...");
        assert_eq!(Scope::self_only("bar").target(), "./bar");
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::recursive(".").to_string(), "./...");
        assert_eq!(Scope::recursive("bar").to_string(), "bar/...");
        assert_eq!(Scope::self_only("bar").to_string(), "bar");
    }
}
