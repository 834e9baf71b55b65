//! Project container and aggregate queries.

use std::borrow::Cow;
use std::path::PathBuf;

use crate::error::LintWarning;
use crate::issue::Issue;
use crate::node::Directory;
use crate::path;
use crate::scope::{InvocationRecord, InvocationStatus, Scope};
use crate::view::{SubView, View, ViewOptions};

/// One analysis run: the scanned tree plus everything the lint phase found.
#[derive(Debug, Clone)]
pub struct Project {
    /// Absolute root path of the project.
    pub root_path: PathBuf,

    /// Root directory of the tree.
    pub root: Directory,

    linters: Vec<String>,
    invocations: Vec<InvocationRecord>,
    warnings: Vec<LintWarning>,
}

impl Project {
    /// Create a project over a scanned tree.
    pub fn new(root_path: impl Into<PathBuf>, root: Directory) -> Self {
        Self {
            root_path: root_path.into(),
            root,
            linters: Vec::new(),
            invocations: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Linters the tool reported as enabled, sorted.
    pub fn linters(&self) -> &[String] {
        &self.linters
    }

    /// Register the enabled linters. Only the first non-empty registration sticks.
    pub fn register_linters(&mut self, mut linters: Vec<String>) {
        if !self.linters.is_empty() {
            return;
        }
        linters.sort();
        linters.dedup();
        self.linters = linters;
    }

    /// Every invocation made while linting, in execution order.
    pub fn invocations(&self) -> &[InvocationRecord] {
        &self.invocations
    }

    pub fn record_invocation(&mut self, scope: Scope, status: InvocationStatus) {
        self.invocations.push(InvocationRecord { scope, status });
    }

    /// Non-fatal conditions met while linting.
    pub fn warnings(&self) -> &[LintWarning] {
        &self.warnings
    }

    /// Merge an issue into the file it refers to.
    ///
    /// Issues for unknown files are dropped with a warning. Returns whether
    /// the issue was merged.
    pub fn add_issue(&mut self, issue: Issue) -> bool {
        let file_path = issue.file_path().to_string();
        let result = match path::components(&file_path) {
            Some(components) => self.root.add_issue(&components, issue),
            None => Err(issue),
        };

        match result {
            Ok(()) => true,
            Err(issue) => {
                tracing::warn!(
                    path = %file_path,
                    linter = %issue.from_linter,
                    "Dropping issue for a file that is not part of the project"
                );
                self.warnings
                    .push(LintWarning::unresolved_issue(file_path, &issue.from_linter));
                false
            }
        }
    }

    /// Populate every directory's view caches in one bottom-up pass.
    ///
    /// Call once the lint phase is over; queries are read-only afterwards.
    pub fn seal(&mut self) {
        self.root.seal();
    }

    pub fn is_sealed(&self) -> bool {
        self.root.is_sealed()
    }

    /// Directory at a project-relative path.
    pub fn directory(&self, path: &str) -> Option<&Directory> {
        self.root.directory(&path::components(path)?)
    }

    /// View for a project-relative path: a file's own view or a directory's
    /// recursive view.
    pub fn subview(&self, path: &str) -> Option<Cow<'_, SubView>> {
        self.root.subview_at(&path::components(path)?)
    }

    /// Answer a view query.
    ///
    /// With a depth, the tree is partitioned at that depth. With paths, each
    /// path contributes its own view; paths no deeper than a given depth are
    /// ignored. Without either, the whole project is one aggregate.
    pub fn generate_view(&self, options: &ViewOptions) -> View {
        let options = options.normalized();

        let mut subviews: Vec<Cow<'_, SubView>> = Vec::new();
        if options.depth.is_some() || options.paths.is_empty() {
            subviews.extend(self.root.subviews_at_depth(options.depth.unwrap_or(0)));
        }
        for path in &options.paths {
            match self.subview(path) {
                Some(view) => subviews.push(view),
                None => tracing::warn!(path = %path, "Requested path is not part of the project"),
            }
        }

        View {
            path: self.root_path.clone(),
            subviews: subviews
                .into_iter()
                .map(|view| {
                    let view = view.into_owned();
                    (view.path.clone(), view)
                })
                .collect(),
            linters: self.linters.clone(),
        }
    }
}
