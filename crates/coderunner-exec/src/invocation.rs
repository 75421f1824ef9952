//! Descriptions of the child processes a request launches.
//!
//! A [`ToolchainInvocation`] is plain data: program, argv, environment
//! overrides and an optional stdin payload. No shell is involved, so
//! nothing in the user's code or options is ever interpreted before it
//! reaches the toolchain.

use std::process::Stdio;

use tokio::process::Command;

use crate::config::RunnerConfig;
use crate::params::ExecutionParams;

/// Trailing argument telling the toolchain to read its source from stdin.
pub const STDIN_MARKER: &str = "-";

/// `TERM` value set when color output is requested.
pub const COLOR_TERM: &str = "xterm-256color";

/// A subprocess to run, with stdout and stderr always piped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// Bytes written to stdin before it is closed. `None` attaches /dev/null.
    pub stdin: Option<Vec<u8>>,
    /// Run the child as the leader of a new process group.
    pub own_process_group: bool,
}

impl ToolchainInvocation {
    /// `<toolchain> <version args...>`
    pub fn version(config: &RunnerConfig) -> Self {
        ToolchainInvocation {
            program: config.toolchain.clone(),
            args: config.version_args.clone(),
            env: Vec::new(),
            stdin: None,
            own_process_group: false,
        }
    }

    /// `<timeout> <secs> <toolchain> <options...> -` with the code on stdin.
    pub fn execution(config: &RunnerConfig, params: &ExecutionParams) -> Self {
        let secs = config.effective_timeout_secs(params.timeout_secs);

        let mut args = vec![secs.to_string(), config.toolchain.clone()];
        args.extend(params.option_args());
        args.push(STDIN_MARKER.to_string());

        let env = if params.color {
            vec![
                ("TERM".to_string(), COLOR_TERM.to_string()),
                ("LD_PRELOAD".to_string(), config.faketty_path.clone()),
            ]
        } else {
            Vec::new()
        };

        ToolchainInvocation {
            program: config.timeout_program.clone(),
            args,
            env,
            stdin: Some(params.code.clone().into_bytes()),
            own_process_group: true,
        }
    }

    /// Space-joined program and argv, for logs and assertions.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Looks up an environment override by name.
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        {
            if self.own_process_group {
                command.process_group(0);
            }
        }

        command
    }
}
