//! Error types for coderunner-exec.
//!
//! Only orchestration failures are errors. A toolchain that exits non-zero,
//! times out, or prints to stderr is a normal result: its output is
//! returned as-is and interpreted by the caller.

use thiserror::Error;

/// Errors produced while launching or talking to child processes.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be started (missing binary, not executable).
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to a child pipe failed.
    #[error("process I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The runner configuration is unusable.
    #[error("invalid runner configuration: {reason}")]
    InvalidConfig { reason: String },
}
