//! Near-duplicate issue categorisation.
//!
//! Issue messages differ mostly in the identifiers they quote. Quoted
//! segments are replaced by a placeholder and issues of the same linter whose
//! normalised messages are within an edit-distance tolerance share a
//! category.

use std::collections::BTreeMap;
use std::fmt;

use derive_builder::Builder;
use rayon::prelude::*;
use serde::Serialize;
use strsim::levenshtein;

use lintree_core::{Issue, View};

/// Placeholder substituted for quoted segments of a message.
pub const IDENTIFIER_PLACEHOLDER: &str = "<identifier>";

const QUOTE_CHARS: [char; 3] = ['"', '`', '\''];

/// Configuration for issue categorisation.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct CategoryConfig {
    /// Maximum edit distance between a message and a category representative.
    #[builder(default = "10")]
    pub tolerance: usize,

    /// Maximum number of categories to return (0 = unlimited).
    #[builder(default = "0")]
    pub max_categories: usize,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            tolerance: 10,
            max_categories: 0,
        }
    }
}

impl CategoryConfig {
    /// Create a new config builder.
    pub fn builder() -> CategoryConfigBuilder {
        CategoryConfigBuilder::default()
    }
}

/// Issues of one linter with near-identical messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueCategory {
    /// Linter that reported every issue of the category.
    pub linter: String,

    /// Normalised message of the first issue in the category.
    pub representative: String,

    /// Member issues, in the order they were categorised.
    pub issues: Vec<Issue>,
}

impl IssueCategory {
    /// Number of occurrences.
    pub fn count(&self) -> usize {
        self.issues.len()
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} occurrences",
            self.linter,
            self.representative,
            self.count()
        )
    }
}

/// Result of ranking a view's issues.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryReport {
    /// Categories sorted by occurrence count, largest first.
    pub categories: Vec<IssueCategory>,

    /// Number of issues that were categorised.
    pub issues_analyzed: usize,

    /// Number of categories before any limit was applied.
    pub category_count: usize,
}

impl CategoryReport {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Ranks the issues of a view by category size.
#[derive(Debug, Default)]
pub struct IssueRanking {
    config: CategoryConfig,
}

impl IssueRanking {
    /// Create a ranking with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ranking with custom config.
    pub fn with_config(config: CategoryConfig) -> Self {
        Self { config }
    }

    /// Categorise every issue of `view`.
    ///
    /// Linters are processed in parallel; within one linter, issues are taken
    /// in view order and join the first category that matches.
    pub fn rank(&self, view: &View) -> CategoryReport {
        let mut by_linter: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();
        for subview in view.subviews.values() {
            for (linter, issues) in &subview.issues {
                by_linter.entry(linter.as_str()).or_default().extend(issues);
            }
        }
        let issues_analyzed = by_linter.values().map(Vec::len).sum();

        let per_linter: Vec<Vec<IssueCategory>> = by_linter
            .into_par_iter()
            .map(|(linter, issues)| categorise(linter, issues, self.config.tolerance))
            .collect();

        let mut categories: Vec<IssueCategory> = per_linter.into_iter().flatten().collect();
        categories.sort_by(|a, b| b.count().cmp(&a.count()));
        let category_count = categories.len();

        if self.config.max_categories > 0 {
            categories.truncate(self.config.max_categories);
        }

        tracing::debug!(
            issues = issues_analyzed,
            categories = category_count,
            "Categorised issues"
        );

        CategoryReport {
            categories,
            issues_analyzed,
            category_count,
        }
    }
}

fn categorise(linter: &str, issues: Vec<&Issue>, tolerance: usize) -> Vec<IssueCategory> {
    let mut categories: Vec<IssueCategory> = Vec::new();

    for issue in issues {
        let normalised = normalise(&issue.text);
        match categories
            .iter_mut()
            .find(|category| levenshtein(&category.representative, &normalised) <= tolerance)
        {
            Some(category) => category.issues.push(issue.clone()),
            None => categories.push(IssueCategory {
                linter: linter.to_string(),
                representative: normalised,
                issues: vec![issue.clone()],
            }),
        }
    }

    categories
}

/// Replace quoted segments of a message with [`IDENTIFIER_PLACEHOLDER`].
///
/// Each quote character is handled in turn; the unquoted pieces and
/// placeholders are re-joined with single spaces and empty pieces dropped.
pub fn normalise(text: &str) -> String {
    let mut current = text.to_string();
    for quote in QUOTE_CHARS {
        let parts: Vec<&str> = current
            .split(quote)
            .enumerate()
            .filter_map(|(idx, part)| {
                if idx % 2 == 1 {
                    Some(IDENTIFIER_PLACEHOLDER)
                } else if part.is_empty() {
                    None
                } else {
                    Some(part)
                }
            })
            .collect();
        current = parts.join(" ");
    }
    current
}
