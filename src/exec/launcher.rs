// src/exec/launcher.rs

//! Starting the deployment script.
//!
//! The child gets the write end of a single OS pipe as both stdout and
//! stderr, so the bytes arrive in exactly the order the process wrote them.
//! It runs in its own process group so that a kill also reaches anything the
//! script started in the background.
//!
//! Exit is observed with `waitid(WNOWAIT)`, which leaves the leader as a
//! zombie. Its PID, and with it the process group ID, cannot be handed to
//! another process until [`RunningProcess::reap`] runs, so every `killpg`
//! before that reaches our group and nobody else's.

use std::io::PipeReader;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Stdio;

use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::sys::wait::{Id, WaitPidFlag, WaitStatus, waitid};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Invocation, TerminationOutcome};

/// True if `path` is a regular file with at least one execute bit set.
pub fn is_executable(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

/// Handle to a started process. Exactly one exists per invocation.
#[derive(Debug)]
pub struct RunningProcess {
    child: Child,
    pid: Option<u32>,
    reaped: bool,
}

/// Spawn the invocation's program.
///
/// Returns the process handle plus the read end of its merged output pipe.
/// Every failure is reported as a `LaunchFailed` outcome; in that case no
/// process exists.
pub fn launch(invocation: &Invocation) -> Result<(RunningProcess, PipeReader), TerminationOutcome> {
    let program = invocation.program();
    if !is_executable(program) {
        return Err(TerminationOutcome::not_executable(program));
    }

    let (reader, writer) = std::io::pipe().map_err(|e| {
        TerminationOutcome::LaunchFailed(format!("cannot create output pipe: {e}"))
    })?;
    let writer_err = writer.try_clone().map_err(|e| {
        TerminationOutcome::LaunchFailed(format!("cannot duplicate output pipe: {e}"))
    })?;

    let mut cmd = Command::new(program);
    cmd.args(invocation.args())
        .stdin(Stdio::null())
        .stdout(writer)
        .stderr(writer_err)
        .process_group(0)
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| {
        TerminationOutcome::LaunchFailed(format!("failed to start {}: {e}", program.display()))
    })?;

    // `cmd` still owns our copies of the write end; the reader only sees EOF
    // once they are closed.
    drop(cmd);

    let pid = child.id();
    debug!(pid, program = %program.display(), "spawned process");

    Ok((
        RunningProcess {
            child,
            pid,
            reaped: false,
        },
        reader,
    ))
}

impl RunningProcess {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Watch for the process to exit without reaping it.
    ///
    /// Resolves to the exit code, or `-signal` when the process was killed by
    /// a signal. Spawn once and poll the handle by reference from `select!`.
    pub fn watch_exit(&self) -> JoinHandle<std::io::Result<i32>> {
        let pid = self.raw_pid();
        tokio::task::spawn_blocking(move || {
            let pid = pid.ok_or_else(|| std::io::Error::other("process id unavailable"))?;
            loop {
                let flags = WaitPidFlag::WEXITED | WaitPidFlag::WNOWAIT;
                match waitid(Id::Pid(Pid::from_raw(pid)), flags) {
                    Ok(WaitStatus::Exited(_, code)) => return Ok(code),
                    Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(-(sig as i32)),
                    Ok(_) | Err(Errno::EINTR) => continue,
                    Err(e) => return Err(e.into()),
                }
            }
        })
    }

    /// SIGKILL the whole process group.
    ///
    /// Also reaches background children left in the group after the leader
    /// exited. Once reaped, only the (already gone) leader is signalled.
    pub fn kill(&mut self) {
        if !self.reaped
            && let Some(pid) = self.raw_pid()
        {
            match killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                Ok(()) => debug!(pid, "sent SIGKILL to process group"),
                Err(Errno::ESRCH) => debug!(pid, "process group already gone"),
                Err(e) => warn!(pid, error = %e, "failed to kill process group"),
            }
        }
        if let Err(e) = self.child.start_kill() {
            debug!(pid = self.pid, error = %e, "start_kill on child failed (already exited?)");
        }
    }

    /// Collect the exit status so no zombie is left behind.
    ///
    /// After this the group is no longer signalled.
    pub async fn reap(&mut self) {
        if let Err(e) = self.child.wait().await {
            warn!(pid = self.pid, error = %e, "failed to reap child process");
        }
        self.reaped = true;
    }

    fn raw_pid(&self) -> Option<i32> {
        self.pid.and_then(|pid| i32::try_from(pid).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_not_executable() {
        assert!(!is_executable(Path::new("/definitely/not/here.sh")));
    }

    #[test]
    fn directory_is_not_executable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_executable(dir.path()));
    }

    #[test]
    fn file_without_exec_bit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.sh");
        std::fs::write(&path, "#!/bin/sh\necho hi\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!is_executable(&path));

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(is_executable(&path));
    }

    /// State letter from `/proc/<pid>/stat`.
    fn proc_state(pid: u32) -> Option<String> {
        let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
        let (_, rest) = stat.rsplit_once(')')?;
        rest.split_whitespace().next().map(str::to_string)
    }

    #[tokio::test]
    async fn exit_is_observed_while_the_pid_stays_reserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exit3.sh");
        std::fs::write(&path, "#!/bin/sh
exit 3
").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let (mut process, _output) = launch(&Invocation::new(&path, vec![], 5)).unwrap();
        let pid = process.pid().unwrap();

        let code = process.watch_exit().await.unwrap().unwrap();
        assert_eq!(code, 3);
        // Not reaped yet: the zombie keeps the PID (and group ID) taken.
        assert_eq!(proc_state(pid).as_deref(), Some("Z"));

        process.kill();
        process.reap().await;
        assert_eq!(proc_state(pid), None);
    }

    #[tokio::test]
    async fn killed_process_reports_negative_signal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sleep.sh");
        std::fs::write(&path, "#!/bin/sh
exec sleep 30
").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let (mut process, _output) = launch(&Invocation::new(&path, vec![], 5)).unwrap();
        let watch = process.watch_exit();
        process.kill();

        assert_eq!(watch.await.unwrap().unwrap(), -9);
        process.reap().await;
    }

    #[test]
    fn launch_of_missing_program_spawns_nothing() {
        let inv = Invocation::new("/definitely/not/here.sh", vec![], 5);
        match launch(&inv) {
            Err(TerminationOutcome::LaunchFailed(reason)) => {
                assert!(reason.contains("/definitely/not/here.sh"));
            }
            other => panic!("expected LaunchFailed, got {other:?}"),
        }
    }
}
