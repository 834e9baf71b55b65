//! Breadth-first lint scheduling with subdivision on memory pressure.

use std::collections::VecDeque;

use futures::future::BoxFuture;

use lintree_core::{
    InterruptCause, InvocationStatus, LintError, LintOptions, Project, Scope, ScopeKind,
};

use crate::supervisor::{InvocationOutcome, ProcessSupervisor};
use crate::tool::{ToolOutput, base_args, scoped_args};
use crate::watchdog::MemorySource;

/// Runs the linter over one scope.
pub trait Linter: Send {
    fn invoke<'a>(
        &'a mut self,
        scope: &'a Scope,
    ) -> BoxFuture<'a, Result<InvocationOutcome, LintError>>;
}

/// golangci-lint driven through a [`ProcessSupervisor`].
#[derive(Debug)]
pub struct GolangciLint<S> {
    supervisor: ProcessSupervisor<S>,
    base_args: Vec<String>,
}

impl<S: MemorySource> GolangciLint<S> {
    pub fn new(options: &LintOptions, supervisor: ProcessSupervisor<S>) -> Self {
        Self {
            supervisor,
            base_args: base_args(options),
        }
    }
}

impl<S: MemorySource> Linter for GolangciLint<S> {
    fn invoke<'a>(
        &'a mut self,
        scope: &'a Scope,
    ) -> BoxFuture<'a, Result<InvocationOutcome, LintError>> {
        Box::pin(async move {
            let args = scoped_args(&self.base_args, scope);
            self.supervisor.run(scope, &args).await
        })
    }
}

/// Scheduling limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Interrupted attempts tolerated for a self-only scope before giving up.
    pub max_self_attempts: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_self_attempts: 3,
        }
    }
}

#[derive(Debug, Clone)]
struct WorkItem {
    scope: Scope,
    /// Interrupted attempts of this scope so far.
    attempts: u32,
}

impl WorkItem {
    fn new(scope: Scope) -> Self {
        Self { scope, attempts: 0 }
    }
}

/// Populates a project with issues, one invocation at a time.
///
/// Work starts with the whole project. When an invocation over a subtree is
/// interrupted, the directory's own files are linted on their own and each
/// child directory is queued as a subtree of its own.
#[derive(Debug)]
pub struct LintScheduler<L> {
    linter: L,
    config: SchedulerConfig,
}

impl<L: Linter> LintScheduler<L> {
    pub fn new(linter: L) -> Self {
        Self {
            linter,
            config: SchedulerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn linter(&self) -> &L {
        &self.linter
    }

    /// Lint the whole project.
    pub async fn lint(&mut self, project: &mut Project) -> Result<(), LintError> {
        let mut queue = VecDeque::from([WorkItem::new(Scope::recursive("."))]);

        while let Some(item) = queue.pop_front() {
            match item.scope.kind {
                ScopeKind::Recursive => self.lint_subtree(project, &mut queue, item).await?,
                ScopeKind::SelfOnly => self.lint_own_files(project, &mut queue, item).await?,
            }
        }

        tracing::debug!(
            invocations = project.invocations().len(),
            linters = project.linters().len(),
            "Linting finished"
        );
        Ok(())
    }

    async fn lint_subtree(
        &mut self,
        project: &mut Project,
        queue: &mut VecDeque<WorkItem>,
        item: WorkItem,
    ) -> Result<(), LintError> {
        let Some(directory) = project.directory(&item.scope.path) else {
            return Ok(());
        };
        if !directory.has_files(true) {
            tracing::debug!(scope = %item.scope, "Skipping scope without source files");
            return Ok(());
        }
        let has_own_files = directory.has_files(false);
        let children: Vec<String> = directory
            .subdirectories
            .values()
            .map(|child| child.path.clone())
            .collect();

        if self.invoke(project, &item.scope).await?.is_none() {
            return Ok(());
        }

        tracing::debug!(
            scope = %item.scope,
            children = children.len(),
            "Spreading lint effort over sub-directories"
        );
        if has_own_files {
            let own = WorkItem::new(Scope::self_only(item.scope.path.as_str()));
            self.lint_own_files(project, queue, own).await?;
        }
        queue.extend(children.into_iter().map(|path| WorkItem::new(Scope::recursive(path))));
        Ok(())
    }

    async fn lint_own_files(
        &mut self,
        project: &mut Project,
        queue: &mut VecDeque<WorkItem>,
        mut item: WorkItem,
    ) -> Result<(), LintError> {
        if self.invoke(project, &item.scope).await?.is_none() {
            return Ok(());
        }

        item.attempts += 1;
        if item.attempts >= self.config.max_self_attempts {
            tracing::error!(
                scope = %item.scope,
                attempts = item.attempts,
                "Directory cannot be linted within the memory budget"
            );
            return Err(LintError::Unsplittable {
                scope: item.scope.to_string(),
                attempts: item.attempts,
            });
        }

        tracing::debug!(scope = %item.scope, attempts = item.attempts, "Requeueing own files");
        queue.push_back(item);
        Ok(())
    }

    /// Run one invocation and merge its findings.
    ///
    /// Returns `None` when the invocation completed and the cause when memory
    /// pressure interrupted it. A termination signal fails the run.
    async fn invoke(
        &mut self,
        project: &mut Project,
        scope: &Scope,
    ) -> Result<Option<InterruptCause>, LintError> {
        match self.linter.invoke(scope).await? {
            InvocationOutcome::Completed { stdout } => {
                project.record_invocation(scope.clone(), InvocationStatus::Completed);
                merge_output(project, scope, &stdout)?;
                Ok(None)
            }
            InvocationOutcome::Interrupted(cause) => {
                project.record_invocation(scope.clone(), InvocationStatus::Interrupted(cause.clone()));
                match cause {
                    InterruptCause::Signal(signal) => Err(LintError::Terminated { signal }),
                    InterruptCause::MemoryPressure => Ok(Some(InterruptCause::MemoryPressure)),
                }
            }
        }
    }
}

fn merge_output(project: &mut Project, scope: &Scope, stdout: &[u8]) -> Result<(), LintError> {
    let output = ToolOutput::decode(scope, stdout)?;
    project.register_linters(output.enabled_linters());

    let issues = output.into_issues();
    tracing::debug!(scope = %scope, issues = issues.len(), "Registering issues");
    for issue in issues {
        project.add_issue(issue);
    }
    Ok(())
}
