//! Runner configuration: which toolchain to call and how to bound it.

use std::time::Duration;

use crate::error::ExecError;

/// Default toolchain binary.
pub const DEFAULT_TOOLCHAIN: &str = "swift";

/// Default argv passed to the toolchain to print its version.
pub const DEFAULT_VERSION_ARGS: &[&str] = &["-version"];

/// Default external timeout wrapper.
pub const DEFAULT_TIMEOUT_PROGRAM: &str = "timeout";

/// Default shared library preloaded to fake an interactive terminal.
pub const DEFAULT_FAKETTY_PATH: &str = "./faketty.so";

/// Static settings shared by every request handled by a [`Runner`](crate::Runner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Toolchain binary, resolved through `PATH`.
    pub toolchain: String,
    /// Arguments that make the toolchain print its version on stdout.
    pub version_args: Vec<String>,
    /// External wrapper that kills the toolchain after N seconds.
    pub timeout_program: String,
    /// Value of `LD_PRELOAD` when color output is requested.
    pub faketty_path: String,
    /// Seconds used when a request does not ask for a timeout.
    pub default_timeout_secs: u64,
    /// Upper bound applied to requested timeouts.
    pub max_timeout_secs: u64,
    /// Extra time granted to the wrapper before the process group is killed.
    pub kill_grace: Duration,
    /// Deadline for the version query.
    pub version_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            toolchain: DEFAULT_TOOLCHAIN.to_string(),
            version_args: DEFAULT_VERSION_ARGS.iter().map(|a| a.to_string()).collect(),
            timeout_program: DEFAULT_TIMEOUT_PROGRAM.to_string(),
            faketty_path: DEFAULT_FAKETTY_PATH.to_string(),
            default_timeout_secs: 30,
            max_timeout_secs: 600,
            kill_grace: Duration::from_secs(5),
            version_timeout: Duration::from_secs(10),
        }
    }
}

impl RunnerConfig {
    /// Checks the settings that would otherwise fail on the first request.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.toolchain.trim().is_empty() {
            return Err(invalid("toolchain must not be empty"));
        }
        if self.timeout_program.trim().is_empty() {
            return Err(invalid("timeout program must not be empty"));
        }
        if self.default_timeout_secs == 0 {
            return Err(invalid("default timeout must be at least 1 second"));
        }
        if self.max_timeout_secs < self.default_timeout_secs {
            return Err(invalid(&format!(
                "max timeout ({}s) is below the default timeout ({}s)",
                self.max_timeout_secs, self.default_timeout_secs
            )));
        }
        Ok(())
    }

    /// Resolves the timeout for one execution.
    ///
    /// Absent or zero falls back to the default; anything above the
    /// configured maximum is clamped.
    pub fn effective_timeout_secs(&self, requested: Option<u64>) -> u64 {
        match requested {
            Some(secs) if secs > 0 => secs.min(self.max_timeout_secs),
            _ => self.default_timeout_secs,
        }
    }

    /// Deadline after which the execution's process group is killed even if
    /// the wrapper has not terminated it.
    pub fn backstop_deadline(&self, requested: Option<u64>) -> Duration {
        Duration::from_secs(self.effective_timeout_secs(requested)) + self.kill_grace
    }
}

fn invalid(reason: &str) -> ExecError {
    ExecError::InvalidConfig {
        reason: reason.to_string(),
    }
}
