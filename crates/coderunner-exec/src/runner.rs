//! [`Runner`]: the version query, buffered execution and streaming execution.

use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::RunnerConfig;
use crate::error::ExecError;
use crate::invocation::ToolchainInvocation;
use crate::params::ExecutionParams;
use crate::process::{read_all, SpawnedProcess};
use crate::stream::{fan_in, labeled, single, FrameKind, FrameStream, StreamFrame};

/// Complete output of one buffered execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferedResult {
    /// Execution stdout.
    pub output: String,
    /// Execution stderr.
    pub errors: String,
    /// Version query stdout, untrimmed.
    pub version: String,
}

/// Launches toolchain processes according to a fixed [`RunnerConfig`].
///
/// Holds no per-request state; one instance is shared by all handlers.
#[derive(Debug, Clone)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    /// Validates the configuration and builds a runner.
    pub fn new(config: RunnerConfig) -> Result<Self, ExecError> {
        config.validate()?;
        Ok(Runner { config })
    }

    /// Runs the toolchain with its version arguments and returns stdout.
    ///
    /// A missing binary, a non-zero exit or a deadline kill all yield
    /// whatever stdout was produced, possibly an empty string. Those cases
    /// are logged, not returned.
    pub async fn query_version(&self) -> String {
        let invocation = ToolchainInvocation::version(&self.config);
        match capture(&invocation, self.config.version_timeout).await {
            Ok(captured) => {
                if !captured.succeeded() {
                    tracing::warn!(
                        command = %invocation.command_line(),
                        stderr = %String::from_utf8_lossy(&captured.stderr),
                        "version query did not succeed"
                    );
                }
                String::from_utf8_lossy(&captured.stdout).into_owned()
            }
            Err(err) => {
                tracing::warn!(command = %invocation.command_line(), error = %err, "version query failed");
                String::new()
            }
        }
    }

    /// Runs the version query and the execution concurrently and returns
    /// once both processes are gone.
    ///
    /// Fails only when the execution process cannot be spawned or its pipes
    /// cannot be read.
    #[tracing::instrument(skip_all, fields(timeout_secs = self.config.effective_timeout_secs(params.timeout_secs)))]
    pub async fn run_buffered(&self, params: &ExecutionParams) -> Result<BufferedResult, ExecError> {
        let invocation = ToolchainInvocation::execution(&self.config, params);
        let deadline = self.config.backstop_deadline(params.timeout_secs);

        let (version, captured) = tokio::join!(self.query_version(), capture(&invocation, deadline));
        let captured = captured?;

        tracing::info!(
            exit = ?captured.status.and_then(|s| s.code()),
            stdout_bytes = captured.stdout.len(),
            stderr_bytes = captured.stderr.len(),
            "buffered run finished"
        );

        Ok(BufferedResult {
            output: String::from_utf8_lossy(&captured.stdout).into_owned(),
            errors: String::from_utf8_lossy(&captured.stderr).into_owned(),
            version,
        })
    }

    /// Spawns the version query and the execution and returns their merged
    /// output as labeled frames.
    ///
    /// The stream ends when every pipe has closed. Dropping it early kills
    /// the execution's process group.
    pub fn stream(&self, params: &ExecutionParams) -> Result<FrameStream, ExecError> {
        let version_invocation = ToolchainInvocation::version(&self.config);
        let execution_invocation = ToolchainInvocation::execution(&self.config, params);
        let deadline = self.config.backstop_deadline(params.timeout_secs);

        let mut sources: Vec<FrameStream> = Vec::with_capacity(4);

        let mut version_process = match SpawnedProcess::spawn(&version_invocation) {
            Ok(mut process) => {
                push_pipes(&mut sources, &mut process, FrameKind::Version, FrameKind::Version);
                Some(process)
            }
            Err(err) => {
                tracing::warn!(command = %version_invocation.command_line(), error = %err, "version query failed");
                sources.push(single(StreamFrame::new(FrameKind::Version, "")));
                None
            }
        };

        let mut execution = SpawnedProcess::spawn(&execution_invocation)?;
        push_pipes(&mut sources, &mut execution, FrameKind::Stdout, FrameKind::Stderr);

        tracing::info!(command = %execution_invocation.command_line(), "streaming run started");

        Ok(Box::pin(async_stream::stream! {
            let mut merged = fan_in(sources);
            let backstop = tokio::time::sleep(deadline);
            tokio::pin!(backstop);
            let mut expired = false;

            loop {
                let next = tokio::select! {
                    frame = merged.next() => Some(frame),
                    _ = &mut backstop, if !expired => None,
                };
                match next {
                    Some(Some(frame)) => yield frame,
                    Some(None) => break,
                    None => {
                        expired = true;
                        tracing::warn!(deadline_secs = deadline.as_secs_f64(), "deadline passed, killing streaming run");
                        execution.kill();
                        if let Some(process) = version_process.as_mut() {
                            process.kill();
                        }
                    }
                }
            }

            let status = execution.wait().await;
            execution.kill();
            if let Some(mut process) = version_process {
                process.wait().await;
            }
            tracing::info!(exit = ?status.and_then(|s| s.code()), "streaming run finished");
        }))
    }
}

fn push_pipes(
    sources: &mut Vec<FrameStream>,
    process: &mut SpawnedProcess,
    stdout_kind: FrameKind,
    stderr_kind: FrameKind,
) {
    if let Some(stdout) = process.take_stdout() {
        sources.push(labeled(stdout, stdout_kind));
    }
    if let Some(stderr) = process.take_stderr() {
        sources.push(labeled(stderr, stderr_kind));
    }
}

struct CapturedOutput {
    status: Option<std::process::ExitStatus>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl CapturedOutput {
    fn succeeded(&self) -> bool {
        self.status.is_some_and(|s| s.success())
    }
}

/// How long pipe reads may outlast the process deadline.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Spawns the invocation and collects both pipes until the process exits or
/// `deadline` forces it to.
///
/// Once the process is gone its group is killed, so leftover background
/// jobs cannot keep the pipes open. Reads stop at `deadline + DRAIN_GRACE`
/// regardless.
async fn capture(invocation: &ToolchainInvocation, deadline: Duration) -> Result<CapturedOutput, ExecError> {
    let mut process = SpawnedProcess::spawn(invocation)?;
    let stdout = process.take_stdout();
    let stderr = process.take_stderr();
    let until = Instant::now() + deadline + DRAIN_GRACE;

    let (stdout, stderr, status) = tokio::join!(read_all(stdout, until), read_all(stderr, until), async {
        let status = process.wait_with_deadline(deadline).await;
        process.kill();
        status
    });

    Ok(CapturedOutput {
        status,
        stdout: stdout?,
        stderr: stderr?,
    })
}
