//! Memory-aware golangci-lint orchestration.
//!
//! The project tree is linted breadth-first, one invocation at a time. Each
//! invocation runs in its own process group under a memory watchdog; when host
//! memory runs short the invocation is killed and its scope is split into the
//! directory's own files plus one scope per child directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use lintree_core::{LintOptions, ViewOptions};
//!
//! # async fn example() -> Result<(), lintree_core::Error> {
//! let project = lintree_lint::parse(".", [LintOptions::with_linters(["govet"])]).await?;
//! let view = project.generate_view(&ViewOptions::new().with_depth(1));
//! println!("{} subviews", view.subviews.len());
//! # Ok(())
//! # }
//! ```

mod kill;
mod platform;
mod scheduler;
mod signal;
mod supervisor;
mod tool;
mod watchdog;

use std::path::Path;

use lintree_core::{Error, LintError, LintOptions, Project, ScanConfig};
use lintree_scan::TreeScanner;

pub use kill::KillSwitch;
pub use platform::{PlatformGroup, ProcessGroup};
pub use scheduler::{GolangciLint, LintScheduler, Linter, SchedulerConfig};
pub use signal::{RelayGuard, SignalRelay};
pub use supervisor::{InvocationOutcome, ProcessSupervisor, SupervisorConfig};
pub use tool::{DEFAULT_PROGRAM, ReportedLinter, ToolOutput, ToolReport, base_args, scoped_args};
pub use watchdog::{
    MemorySample, MemorySource, MemoryWatchdog, PressureGauge, SampleError, SystemMemory,
    WatchdogConfig,
};

/// Settings of a complete analysis run.
#[derive(Debug, Clone)]
pub struct Analyzer {
    program: String,
    watchdog: WatchdogConfig,
    scheduler: SchedulerConfig,
    threads: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            watchdog: WatchdogConfig::default(),
            scheduler: SchedulerConfig::default(),
            threads: 0,
        }
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another linter executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_watchdog(mut self, watchdog: WatchdogConfig) -> Self {
        self.watchdog = watchdog;
        self
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Number of scanning threads (0 = auto-detect).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Scan and lint the project at `root`, then seal it for queries.
    pub async fn run<I>(&self, root: impl AsRef<Path>, options: I) -> Result<Project, Error>
    where
        I: IntoIterator<Item = LintOptions>,
    {
        let options = LintOptions::aggregate(options)?;

        let scan_config = ScanConfig {
            exclude_dirs: options.exclude_dirs.clone(),
            threads: self.threads,
            ..ScanConfig::new(root.as_ref())
        };
        let mut project = TreeScanner::new().scan(&scan_config)?;
        tracing::debug!(
            root = %project.root_path.display(),
            files = project.root.file_count(),
            "Project scanned"
        );

        let relay = SignalRelay::install().map_err(LintError::Io)?;
        let supervisor = ProcessSupervisor::new(
            SupervisorConfig::new(&project.root_path).with_program(self.program.as_str()),
            MemoryWatchdog::system(self.watchdog),
            relay,
        );
        let mut scheduler =
            LintScheduler::new(GolangciLint::new(&options, supervisor)).with_config(self.scheduler);
        scheduler.lint(&mut project).await?;

        project.seal();
        Ok(project)
    }
}

/// Scan and lint the project at `root` with default settings.
pub async fn parse<I>(root: impl AsRef<Path>, options: I) -> Result<Project, Error>
where
    I: IntoIterator<Item = LintOptions>,
{
    Analyzer::default().run(root, options).await
}
