//! Source tree scanning for lintree.
//!
//! This crate walks a project directory with jwalk, prunes excluded
//! directories without descending into them, and builds the
//! [`Directory`] tree with a code-line count for every source file.
//!
//! # Example
//!
//! ```rust,no_run
//! use lintree_scan::{ScanConfig, TreeScanner};
//!
//! let config = ScanConfig::new("/path/to/project");
//! let project = TreeScanner::new().scan(&config).unwrap();
//!
//! println!("{} source files", project.root.file_count());
//! ```

mod loc;
mod scanner;

pub use loc::{count_code_lines, count_file_lines};
pub use scanner::TreeScanner;

// Re-export core types for convenience
pub use lintree_core::{Directory, File, Project, ScanConfig, ScanError};
