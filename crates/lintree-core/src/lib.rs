//! Core types for lintree.
//!
//! This crate provides the project tree populated by lint runs, the issue
//! payloads, configuration, and the aggregation queries answered once
//! linting has finished.

mod config;
mod error;
mod issue;
mod node;
pub mod path;
mod scope;
mod tree;
mod view;

pub use config::{
    DEFAULT_EXCLUDED_DIRS, LintOptions, LintOptionsBuilder, ScanConfig, ScanConfigBuilder,
    read_skip_dirs,
};
pub use error::{ConfigError, Error, LintError, LintWarning, ScanError, WarningKind};
pub use issue::{Issue, LineRange, Position};
pub use node::{Directory, File, recursive_label};
pub use scope::{InterruptCause, InvocationRecord, InvocationStatus, Scope, ScopeKind};
pub use tree::Project;
pub use view::{SubView, View, ViewOptions};
