//! Issue analysis for lintree.
//!
//! Groups the issues of a [`View`] into categories of near-identical
//! messages, so the most widespread problems of a codebase stand out:
//!
//! ```rust,ignore
//! use lintree_analyze::{CategoryConfig, IssueRanking};
//! use lintree_core::ViewOptions;
//!
//! let project = lintree_lint::parse(".", []).await?;
//! let view = project.generate_view(&ViewOptions::default());
//!
//! let config = CategoryConfig::builder().tolerance(5usize).build().unwrap();
//! let report = IssueRanking::with_config(config).rank(&view);
//!
//! for category in report.categories.iter().take(10) {
//!     println!("{category}");
//! }
//! ```

mod categories;

pub use categories::{
    CategoryConfig, CategoryConfigBuilder, CategoryReport, IDENTIFIER_PLACEHOLDER, IssueCategory,
    IssueRanking, normalise,
};

// Re-export core types
pub use lintree_core::{Issue, View};
