//! Whole-process-tree start and kill, per platform.

use std::io;

use tokio::process::Command;

/// Start a command in its own process group and kill that group as a whole.
pub trait ProcessGroup: Send + Sync {
    /// Arrange for the command to start as the leader of a new group.
    fn configure(&self, command: &mut Command);

    /// Kill the group led by `pid`, including any helpers it spawned.
    fn kill(&self, pid: u32) -> io::Result<()>;
}

/// Process groups of the host platform.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformGroup;

#[cfg(unix)]
impl ProcessGroup for PlatformGroup {
    fn configure(&self, command: &mut Command) {
        command.process_group(0);
    }

    fn kill(&self, pid: u32) -> io::Result<()> {
        let pgid = libc::pid_t::try_from(pid)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
        // SAFETY: kill(2) has no memory-safety preconditions.
        let result = unsafe { libc::kill(-pgid, libc::SIGKILL) };
        if result == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        // The group is already gone.
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Ok(());
        }
        Err(err)
    }
}

#[cfg(windows)]
impl ProcessGroup for PlatformGroup {
    fn configure(&self, command: &mut Command) {
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        command.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }

    fn kill(&self, pid: u32) -> io::Result<()> {
        let output = std::process::Command::new("TASKKILL")
            .args(["/T", "/F", "/PID", &pid.to_string()])
            .output()?;
        tracing::debug!(
            pid,
            stdout = %String::from_utf8_lossy(&output.stdout),
            stderr = %String::from_utf8_lossy(&output.stderr),
            "TASKKILL finished"
        );
        if output.status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "TASKKILL exited with {}",
                output.status
            )))
        }
    }
}
