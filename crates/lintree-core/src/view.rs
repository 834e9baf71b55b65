//! Aggregated, read-only views over the issue tree.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::issue::Issue;
use crate::path;

/// Aggregated issues and line counts for one scope of the project.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubView {
    /// Label of the scope: a file path, a directory path for its own files,
    /// or `"<dir>/..."` for a whole subtree.
    pub path: String,

    /// Issues grouped by linter.
    pub issues: BTreeMap<String, Vec<Issue>>,

    /// Summed code-line count.
    pub line_count: u64,

    /// Whether the view covers a whole subtree.
    pub recursive: bool,
}

impl SubView {
    /// Fuse several views into one.
    ///
    /// Per-linter issue lists are concatenated in input order and line counts
    /// are summed. `None` inputs are skipped. The result carries no label.
    pub fn fuse<'a, I, V>(views: I) -> SubView
    where
        I: IntoIterator<Item = V>,
        V: Into<Option<&'a SubView>>,
    {
        let mut fused = SubView::default();
        for view in views {
            let view: Option<&SubView> = view.into();
            let Some(view) = view else {
                continue;
            };
            for (linter, issues) in &view.issues {
                fused
                    .issues
                    .entry(linter.clone())
                    .or_default()
                    .extend(issues.iter().cloned());
            }
            fused.line_count += view.line_count;
        }
        fused
    }

    /// Stable-sort every linter's issues by file, line, column and message.
    pub fn sort_issues(&mut self) {
        for issues in self.issues.values_mut() {
            issues.sort_by(Issue::cmp_position);
        }
    }

    /// Total number of issues across linters.
    pub fn issue_count(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }

    /// Number of issues reported by one linter.
    pub fn linter_issue_count(&self, linter: &str) -> usize {
        self.issues.get(linter).map_or(0, Vec::len)
    }

    /// Issues of one linter per thousand code lines.
    pub fn density(&self, linter: &str) -> f64 {
        let count = self.linter_issue_count(linter);
        if count == 0 {
            return 0.0;
        }
        count as f64 * 1000.0 / self.line_count.max(1) as f64
    }
}

/// A bundle of sub-views answering one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct View {
    /// Root path of the project.
    pub path: PathBuf,

    /// Sub-views keyed by their label.
    pub subviews: BTreeMap<String, SubView>,

    /// Linters enabled during the run, sorted.
    pub linters: Vec<String>,
}

/// Selects which sub-views a [`View`] contains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    /// Uniform depth. `None` means no depth split.
    pub depth: Option<usize>,

    /// Explicit project-relative paths.
    pub paths: Vec<String>,
}

impl ViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split the tree at a uniform depth.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Add explicit paths.
    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Combine option sets: the last depth given wins, paths are unioned.
    pub fn merge<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ViewOptions>,
    {
        options.into_iter().fold(Self::default(), |mut acc, opt| {
            if opt.depth.is_some() {
                acc.depth = opt.depth;
            }
            acc.paths.extend(opt.paths);
            acc
        })
    }

    /// Sort and deduplicate paths, dropping those no deeper than `depth`.
    pub fn normalized(&self) -> Self {
        let mut paths: Vec<String> = self
            .paths
            .iter()
            .map(|p| path::normalize(p).unwrap_or_else(|| p.clone()))
            .filter(|p| match self.depth {
                Some(depth) => path::depth(p) > depth,
                None => true,
            })
            .collect();
        paths.sort();
        paths.dedup();

        Self {
            depth: self.depth,
            paths,
        }
    }
}
