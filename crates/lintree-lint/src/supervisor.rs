//! Lifecycle of one external linter invocation.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use lintree_core::{InterruptCause, LintError, Scope};

use crate::kill::KillSwitch;
use crate::platform::{PlatformGroup, ProcessGroup};
use crate::signal::SignalRelay;
use crate::tool::DEFAULT_PROGRAM;
use crate::watchdog::{MemorySource, MemoryWatchdog, SystemMemory};

/// What to run and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Linter executable.
    pub program: String,
    /// Working directory of every invocation, normally the project root.
    pub working_dir: PathBuf,
}

impl SupervisorConfig {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            working_dir: working_dir.into(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

/// Result of an invocation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The linter exited on its own and successfully.
    Completed { stdout: Vec<u8> },
    /// The linter was killed before it could finish.
    Interrupted(InterruptCause),
}

/// Runs the linter one invocation at a time.
///
/// Each run races the process's natural exit against the memory watchdog and
/// the signal relay. Both helpers have observed the end of the invocation by
/// the time [`run`](Self::run) returns.
pub struct ProcessSupervisor<S = SystemMemory> {
    config: SupervisorConfig,
    watchdog: MemoryWatchdog<S>,
    relay: SignalRelay,
    group: Arc<dyn ProcessGroup>,
}

impl<S> std::fmt::Debug for ProcessSupervisor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("config", &self.config)
            .field("relay", &self.relay)
            .finish_non_exhaustive()
    }
}

impl<S: MemorySource> ProcessSupervisor<S> {
    pub fn new(config: SupervisorConfig, watchdog: MemoryWatchdog<S>, relay: SignalRelay) -> Self {
        Self {
            config,
            watchdog,
            relay,
            group: Arc::new(PlatformGroup),
        }
    }

    /// Use another process group implementation.
    pub fn with_group(mut self, group: Arc<dyn ProcessGroup>) -> Self {
        self.group = group;
        self
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn relay(&self) -> &SignalRelay {
        &self.relay
    }

    /// Run the linter with `args` for `scope` and wait for the outcome.
    pub async fn run(
        &mut self,
        scope: &Scope,
        args: &[String],
    ) -> Result<InvocationOutcome, LintError> {
        let Self {
            config,
            watchdog,
            relay,
            group,
        } = self;

        if let Some(signal) = relay.terminated() {
            return Ok(InvocationOutcome::Interrupted(InterruptCause::Signal(
                signal.to_string(),
            )));
        }

        let mut command = Command::new(&config.program);
        command
            .args(args)
            .current_dir(&config.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        group.configure(&mut command);

        tracing::debug!(scope = %scope, program = %config.program, "Running linter");
        let child = command.spawn().map_err(|source| {
            tracing::error!(program = %config.program, error = %source, "Unable to run linter");
            LintError::Start {
                program: config.program.clone(),
                source,
            }
        })?;
        let pid = child
            .id()
            .ok_or_else(|| io::Error::other("linter exited before its pid was known"))?;

        let switch = Arc::new(KillSwitch::new(pid, group.clone()));
        let _attached = relay.attach(switch.clone());
        let cancel = CancellationToken::new();

        let exit = async {
            let output = child.wait_with_output().await;
            let killed = switch.mark_exited();
            cancel.cancel();
            (output, killed)
        };
        let pressure = async {
            if watchdog.watch(cancel.clone()).await {
                switch.interrupt(InterruptCause::MemoryPressure);
            }
        };
        let ((output, killed), ()) = tokio::join!(exit, pressure);
        let output = output?;

        if let Some(cause) = killed {
            tracing::debug!(scope = %scope, cause = %cause, "Linter run was interrupted");
            return Ok(InvocationOutcome::Interrupted(cause));
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!(
                scope = %scope,
                status = %output.status,
                stdout = %String::from_utf8_lossy(&output.stdout),
                stderr = %stderr,
                "Linter exited with an error"
            );
            return Err(LintError::ExitStatus {
                scope: scope.to_string(),
                status: output.status,
                stderr,
            });
        }

        tracing::debug!(scope = %scope, bytes = output.stdout.len(), "Linter run completed");
        Ok(InvocationOutcome::Completed {
            stdout: output.stdout,
        })
    }
}
