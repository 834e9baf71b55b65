//! Serialises the kill decision against natural process exit.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lintree_core::InterruptCause;

use crate::platform::ProcessGroup;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SwitchState {
    Running(u32),
    Exited,
    Killed(InterruptCause),
}

/// Kill switch for one running process group.
///
/// Whichever of [`interrupt`](Self::interrupt) and
/// [`mark_exited`](Self::mark_exited) takes the lock first decides the
/// outcome: a kill is never sent after exit was reported, and an exit
/// observed after a kill reports the kill.
pub struct KillSwitch {
    state: Mutex<SwitchState>,
    group: Arc<dyn ProcessGroup>,
}

impl KillSwitch {
    pub fn new(pid: u32, group: Arc<dyn ProcessGroup>) -> Self {
        Self {
            state: Mutex::new(SwitchState::Running(pid)),
            group,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SwitchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Kill the process group if it is still running.
    ///
    /// Returns whether this call killed it.
    pub fn interrupt(&self, cause: InterruptCause) -> bool {
        let mut state = self.lock();
        let SwitchState::Running(pid) = *state else {
            return false;
        };

        tracing::info!(pid, cause = %cause, "Killing linter");
        if let Err(e) = self.group.kill(pid) {
            tracing::error!(pid, error = %e, "Failed to kill linter process group");
        }
        *state = SwitchState::Killed(cause);
        true
    }

    /// Record that the process exited. Returns the cause if it was killed.
    pub fn mark_exited(&self) -> Option<InterruptCause> {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, SwitchState::Exited) {
            SwitchState::Killed(cause) => {
                *state = SwitchState::Killed(cause.clone());
                Some(cause)
            }
            SwitchState::Running(_) | SwitchState::Exited => None,
        }
    }
}

impl std::fmt::Debug for KillSwitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KillSwitch")
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}
