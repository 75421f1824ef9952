//! Validated per-request execution parameters.

/// Everything a single execution needs from the client.
///
/// Built by the HTTP layer after validation, so `code` is known to be
/// non-empty here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionParams {
    /// Source text fed to the toolchain on stdin.
    pub code: String,
    /// Raw toolchain flags, split on whitespace.
    pub options: Option<String>,
    /// Requested wall-clock limit in seconds.
    pub timeout_secs: Option<u64>,
    /// Force ANSI color output through a fake terminal.
    pub color: bool,
}

impl ExecutionParams {
    pub fn new(code: impl Into<String>) -> Self {
        ExecutionParams {
            code: code.into(),
            ..ExecutionParams::default()
        }
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Option tokens in the order they were given.
    pub fn option_args(&self) -> Vec<String> {
        self.options
            .as_deref()
            .map(|opts| opts.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
