//! Application state shared by all handlers.
//!
//! The runner is immutable after start-up, so a plain `Arc` is enough; there
//! is no per-request state to lock.

use std::sync::Arc;

use coderunner_exec::{Runner, RunnerConfig};

use crate::error::ApiError;

/// Default request body limit (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    /// Launches toolchain processes.
    pub runner: Arc<Runner>,
    /// Bodies above this size are rejected with 413 before validation.
    pub max_body_bytes: usize,
}

impl AppState {
    /// Creates an `AppState` with a validated runner configuration.
    pub fn new(config: RunnerConfig) -> Result<Self, ApiError> {
        Self::with_body_limit(config, DEFAULT_MAX_BODY_BYTES)
    }

    pub fn with_body_limit(config: RunnerConfig, max_body_bytes: usize) -> Result<Self, ApiError> {
        let runner = Runner::new(config)?;
        Ok(AppState {
            runner: Arc::new(runner),
            max_body_bytes,
        })
    }
}
