//! Spawned child handle that never outlives its owner.
//!
//! A [`SpawnedProcess`] that is dropped before its child was reaped kills
//! the child. For invocations that run in their own process group the whole
//! group is killed, which also takes down the toolchain running under the
//! timeout wrapper.

use std::process::ExitStatus;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::time::Instant;

use crate::error::ExecError;
use crate::invocation::ToolchainInvocation;

pub(crate) struct SpawnedProcess {
    child: Child,
    program: String,
    process_group: Option<i32>,
    reaped: bool,
}

impl SpawnedProcess {
    /// Spawns the invocation and starts feeding its stdin payload.
    pub(crate) fn spawn(invocation: &ToolchainInvocation) -> Result<Self, ExecError> {
        tracing::debug!(command = %invocation.command_line(), "spawning");

        let mut child = invocation
            .command()
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let process_group = if invocation.own_process_group {
            child.id().and_then(|pid| i32::try_from(pid).ok())
        } else {
            None
        };

        if let (Some(payload), Some(mut stdin)) = (invocation.stdin.clone(), child.stdin.take()) {
            let program = invocation.program.clone();
            tokio::spawn(async move {
                // The child may exit without reading everything; a broken
                // pipe here is expected.
                if let Err(err) = stdin.write_all(&payload).await {
                    tracing::debug!(%program, error = %err, "stdin write stopped");
                }
            });
        }

        Ok(SpawnedProcess {
            child,
            program: invocation.program.clone(),
            process_group,
            reaped: false,
        })
    }

    pub(crate) fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub(crate) fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Waits for exit. Wait failures are logged and reported as `None`.
    pub(crate) async fn wait(&mut self) -> Option<ExitStatus> {
        match self.child.wait().await {
            Ok(status) => {
                self.reaped = true;
                tracing::debug!(program = %self.program, %status, "process exited");
                Some(status)
            }
            Err(err) => {
                tracing::warn!(program = %self.program, error = %err, "failed to wait on process");
                None
            }
        }
    }

    /// Waits for exit, killing the process (group) once `deadline` passes.
    pub(crate) async fn wait_with_deadline(&mut self, deadline: Duration) -> Option<ExitStatus> {
        let waited = tokio::time::timeout(deadline, self.wait()).await;
        match waited {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(
                    program = %self.program,
                    deadline_secs = deadline.as_secs_f64(),
                    "deadline passed, killing process"
                );
                self.kill();
                self.wait().await
            }
        }
    }

    /// Sends SIGKILL to the process group, or to the child alone when it
    /// does not lead one.
    ///
    /// A group is signalled even after its leader was reaped: background
    /// jobs the leader left behind are still members and may hold its pipes.
    pub(crate) fn kill(&mut self) {
        #[cfg(unix)]
        {
            if let Some(pgid) = self.process_group {
                // SAFETY: killpg only sends a signal. The group id cannot be
                // reused while any member of the group is alive.
                let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
                if rc != 0 {
                    let err = std::io::Error::last_os_error();
                    // ESRCH: the group is already empty.
                    if err.raw_os_error() != Some(libc::ESRCH) {
                        tracing::debug!(program = %self.program, pgid, error = %err, "killpg failed");
                    }
                }
                return;
            }
        }

        if self.reaped {
            return;
        }
        if let Err(err) = self.child.start_kill() {
            tracing::debug!(program = %self.program, error = %err, "kill failed");
        }
    }
}

impl Drop for SpawnedProcess {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        if self.process_group.is_none() && matches!(self.child.try_wait(), Ok(Some(_))) {
            return;
        }
        tracing::debug!(program = %self.program, "dropping live process, killing it");
        self.kill();
    }
}

/// Reads a pipe to the end, or until `until` passes. A missing pipe reads
/// as empty; output read before the cutoff is kept.
pub(crate) async fn read_all<R>(pipe: Option<R>, until: Instant) -> Result<Vec<u8>, ExecError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let Some(mut pipe) = pipe else {
        return Ok(buf);
    };

    let mut chunk = [0u8; 8 * 1024];
    loop {
        match tokio::time::timeout_at(until, pipe.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => buf.extend_from_slice(&chunk[..n]),
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => {
                tracing::warn!(bytes = buf.len(), "pipe still open past deadline, keeping partial output");
                break;
            }
        }
    }
    Ok(buf)
}
