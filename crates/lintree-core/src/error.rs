//! Error and warning types.

use std::path::PathBuf;
use std::process::ExitStatus;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building the directory tree.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Errors in the lint configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// More than one distinct tool configuration file was given.
    #[error("Conflicting options: multiple configuration files were specified: {0:?}")]
    ConflictingConfigs(Vec<PathBuf>),

    #[error("Failed to read configuration file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {message}")]
    ParseConfig { path: PathBuf, message: String },

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// A requested report path lies outside the project.
    #[error("Path {path} is outside of the targeted project at {root}")]
    PathOutsideProject { path: PathBuf, root: PathBuf },
}

/// Fatal errors raised while driving the external lint tool.
#[derive(Debug, Error)]
pub enum LintError {
    /// The tool could not be launched.
    #[error("Unable to start {program}: {source}")]
    Start {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool exited abnormally for reasons unrelated to an interruption.
    #[error("Linter exited with {status} on {scope}: {stderr}")]
    ExitStatus {
        scope: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The tool's output could not be decoded.
    #[error("Could not parse linter output for {scope}: {source}")]
    MalformedOutput {
        scope: String,
        #[source]
        source: serde_json::Error,
    },

    /// The run was stopped by an OS termination signal.
    #[error("Linting terminated by signal {signal}")]
    Terminated { signal: String },

    /// A self-only scope kept exceeding the memory budget.
    #[error("Scope {scope} exceeded the memory budget {attempts} times and cannot be split further")]
    Unsplittable { scope: String, attempts: u32 },

    #[error("I/O error while supervising the linter: {0}")]
    Io(#[from] std::io::Error),
}

/// Any fatal error of a complete analysis run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lint(#[from] LintError),
}

/// Kind of lint warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// An issue referenced a file that is not part of the tree.
    UnresolvedIssue,
}

/// Non-fatal condition recorded during the lint phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintWarning {
    /// Path the warning refers to.
    pub path: String,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl LintWarning {
    /// Create an unresolved-issue warning.
    pub fn unresolved_issue(path: impl Into<String>, linter: &str) -> Self {
        let path = path.into();
        Self {
            message: format!("Dropped {linter} issue for unknown file {path}"),
            path,
            kind: WarningKind::UnresolvedIssue,
        }
    }
}
