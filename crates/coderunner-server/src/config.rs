//! Server configuration read from `CODERUNNER_*` environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `CODERUNNER_HOST` | `0.0.0.0` |
//! | `CODERUNNER_PORT` | `8000` |
//! | `CODERUNNER_MAX_BODY_BYTES` | `1048576` |
//! | `CODERUNNER_TOOLCHAIN` | `swift` |
//! | `CODERUNNER_VERSION_ARGS` | `-version` |
//! | `CODERUNNER_TIMEOUT_BIN` | `timeout` |
//! | `CODERUNNER_FAKETTY` | `./faketty.so` |
//! | `CODERUNNER_DEFAULT_TIMEOUT` | `30` |
//! | `CODERUNNER_MAX_TIMEOUT` | `600` |
//! | `CODERUNNER_KILL_GRACE` | `5` |

use std::str::FromStr;
use std::time::Duration;

use coderunner_exec::{ExecError, RunnerConfig};

use crate::state::DEFAULT_MAX_BODY_BYTES;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: cannot parse '{value}' as a number")]
    InvalidNumber { var: &'static str, value: String },

    #[error(transparent)]
    Runner(#[from] ExecError),
}

/// Everything the binary needs to start listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub runner: RunnerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            runner: RunnerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        let runner_defaults = defaults.runner.clone();

        let runner = RunnerConfig {
            toolchain: lookup("CODERUNNER_TOOLCHAIN").unwrap_or(runner_defaults.toolchain),
            version_args: lookup("CODERUNNER_VERSION_ARGS")
                .map(|args| args.split_whitespace().map(str::to_string).collect())
                .unwrap_or(runner_defaults.version_args),
            timeout_program: lookup("CODERUNNER_TIMEOUT_BIN")
                .unwrap_or(runner_defaults.timeout_program),
            faketty_path: lookup("CODERUNNER_FAKETTY").unwrap_or(runner_defaults.faketty_path),
            default_timeout_secs: number(&lookup, "CODERUNNER_DEFAULT_TIMEOUT")?
                .unwrap_or(runner_defaults.default_timeout_secs),
            max_timeout_secs: number(&lookup, "CODERUNNER_MAX_TIMEOUT")?
                .unwrap_or(runner_defaults.max_timeout_secs),
            kill_grace: number(&lookup, "CODERUNNER_KILL_GRACE")?
                .map(Duration::from_secs)
                .unwrap_or(runner_defaults.kill_grace),
            version_timeout: runner_defaults.version_timeout,
        };
        runner.validate()?;

        Ok(ServerConfig {
            host: lookup("CODERUNNER_HOST").unwrap_or(defaults.host),
            port: number(&lookup, "CODERUNNER_PORT")?.unwrap_or(defaults.port),
            max_body_bytes: number(&lookup, "CODERUNNER_MAX_BODY_BYTES")?
                .unwrap_or(defaults.max_body_bytes),
            runner,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn number<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::InvalidNumber { var, value }),
        },
    }
}
