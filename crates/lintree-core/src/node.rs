//! Directory and file node types.

use std::borrow::Cow;
use std::collections::BTreeMap;

use compact_str::CompactString;

use crate::issue::Issue;
use crate::view::SubView;

/// A source file and the issues reported against it.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Project-relative path.
    pub path: String,

    /// Number of code lines (non-blank, non-comment).
    pub line_count: u64,

    /// Issues grouped by linter, in merge order.
    pub issues: BTreeMap<String, Vec<Issue>>,
}

impl File {
    /// Create a file without issues.
    pub fn new(path: impl Into<String>, line_count: u64) -> Self {
        Self {
            path: path.into(),
            line_count,
            issues: BTreeMap::new(),
        }
    }

    /// Append an issue to its linter's list.
    pub fn add_issue(&mut self, issue: Issue) {
        self.issues
            .entry(issue.from_linter.clone())
            .or_default()
            .push(issue);
    }

    /// Total number of issues across linters.
    pub fn issue_count(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }

    /// View scoped to exactly this file.
    pub fn subview(&self) -> SubView {
        let mut view = SubView {
            path: self.path.clone(),
            issues: self.issues.clone(),
            line_count: self.line_count,
            recursive: false,
        };
        view.sort_issues();
        view
    }
}

/// A directory in the project tree.
///
/// Views are cached once [`Directory::seal`] has run; before that they are
/// computed on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    /// Project-relative path, `"."` for the root.
    pub path: String,

    /// Child directories by name.
    pub subdirectories: BTreeMap<CompactString, Directory>,

    /// Source files by name.
    pub files: BTreeMap<CompactString, File>,

    self_view: Option<SubView>,
    recursive_view: Option<SubView>,
}

impl Directory {
    /// Create an empty directory.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            subdirectories: BTreeMap::new(),
            files: BTreeMap::new(),
            self_view: None,
            recursive_view: None,
        }
    }

    /// Whether this directory (and, if `recursive`, any descendant) holds a source file.
    pub fn has_files(&self, recursive: bool) -> bool {
        if !self.files.is_empty() {
            return true;
        }
        recursive && self.subdirectories.values().any(|d| d.has_files(true))
    }

    /// Number of source files in this subtree.
    pub fn file_count(&self) -> usize {
        self.files.len()
            + self
                .subdirectories
                .values()
                .map(Directory::file_count)
                .sum::<usize>()
    }

    /// Look up a descendant directory by path components.
    pub fn directory(&self, components: &[&str]) -> Option<&Directory> {
        match components {
            [] => Some(self),
            [name, rest @ ..] => self.subdirectories.get(*name)?.directory(rest),
        }
    }

    /// Look up a descendant directory mutably by path components.
    pub fn directory_mut(&mut self, components: &[&str]) -> Option<&mut Directory> {
        match components {
            [] => Some(self),
            [name, rest @ ..] => self.subdirectories.get_mut(*name)?.directory_mut(rest),
        }
    }

    /// Merge an issue into the file at the given path components.
    ///
    /// Hands the issue back if no such file exists. Cached views on the way
    /// down are discarded.
    pub fn add_issue(&mut self, components: &[&str], issue: Issue) -> Result<(), Issue> {
        match components {
            [] => Err(issue),
            [name] => match self.files.get_mut(*name) {
                Some(file) => {
                    self.self_view = None;
                    self.recursive_view = None;
                    file.add_issue(issue);
                    Ok(())
                }
                None => Err(issue),
            },
            [name, rest @ ..] => match self.subdirectories.get_mut(*name) {
                Some(dir) => {
                    dir.add_issue(rest, issue)?;
                    self.recursive_view = None;
                    Ok(())
                }
                None => Err(issue),
            },
        }
    }

    /// Fill the view caches of this subtree, children first.
    pub fn seal(&mut self) {
        for child in self.subdirectories.values_mut() {
            child.seal();
        }
        self.self_view = Some(self.compute_self_view());
        self.recursive_view = Some(self.compute_recursive_view());
    }

    /// Whether the view caches are populated.
    pub fn is_sealed(&self) -> bool {
        self.self_view.is_some() && self.recursive_view.is_some()
    }

    /// Aggregate over the files directly in this directory.
    pub fn self_view(&self) -> Cow<'_, SubView> {
        match self.self_view {
            Some(ref view) => Cow::Borrowed(view),
            None => Cow::Owned(self.compute_self_view()),
        }
    }

    /// Aggregate over every file in this subtree.
    pub fn recursive_view(&self) -> Cow<'_, SubView> {
        match self.recursive_view {
            Some(ref view) => Cow::Borrowed(view),
            None => Cow::Owned(self.compute_recursive_view()),
        }
    }

    /// Views partitioning this subtree at the given depth.
    ///
    /// Depth 0 is this directory's recursive view. Otherwise this directory
    /// contributes its own files and each child is split at `depth - 1`.
    pub fn subviews_at_depth(&self, depth: usize) -> Vec<Cow<'_, SubView>> {
        if depth == 0 {
            return vec![self.recursive_view()];
        }

        let mut views = vec![self.self_view()];
        for child in self.subdirectories.values() {
            views.extend(child.subviews_at_depth(depth - 1));
        }
        views
    }

    /// View for the file or directory at the given path components.
    pub fn subview_at(&self, components: &[&str]) -> Option<Cow<'_, SubView>> {
        match components {
            [] => Some(self.recursive_view()),
            [name, rest @ ..] => {
                if let Some(dir) = self.subdirectories.get(*name) {
                    return dir.subview_at(rest);
                }
                if rest.is_empty() {
                    return self.files.get(*name).map(|f| Cow::Owned(f.subview()));
                }
                None
            }
        }
    }

    fn compute_self_view(&self) -> SubView {
        let file_views: Vec<SubView> = self.files.values().map(File::subview).collect();
        let mut view = SubView::fuse(&file_views);
        view.path = self.path.clone();
        view.sort_issues();
        view
    }

    fn compute_recursive_view(&self) -> SubView {
        let mut parts = vec![self.self_view()];
        parts.extend(self.subdirectories.values().map(Directory::recursive_view));

        let mut view = SubView::fuse(parts.iter().map(|view| &**view));
        view.path = recursive_label(&self.path);
        view.recursive = true;
        view.sort_issues();
        view
    }
}

/// Label of a directory's recursive view.
pub fn recursive_label(path: &str) -> String {
    format!("{path}/...")
}
