//! API schema types for `POST /runner/{version}/run`.
//!
//! The body is parsed by hand rather than through the `Json` extractor so
//! every failure maps to a precise [`RequestError`] and a plain-text 400.

use serde::Deserialize;
use serde_json::error::Category;

use coderunner_exec::ExecutionParams;

use crate::error::RequestError;

/// Request body for `POST /runner/{version}/run`.
///
/// Unknown fields (such as the legacy `command`) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    /// Source text to execute. Required and non-empty.
    #[serde(default)]
    pub code: Option<String>,

    /// Raw toolchain flags.
    #[serde(default)]
    pub options: Option<String>,

    /// Wall-clock limit in seconds (default: server setting, usually 30).
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Make the toolchain believe it writes to a color terminal.
    #[serde(default, rename = "_color")]
    pub color: Option<bool>,

    /// Stream labeled frames instead of one JSON object.
    #[serde(default, rename = "_streaming")]
    pub streaming: Option<bool>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRun {
    pub params: ExecutionParams,
    pub streaming: bool,
}

impl RunRequest {
    /// Parses a raw body, classifying serde failures.
    pub fn from_body(body: &[u8]) -> Result<Self, RequestError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(RequestError::EmptyBody);
        }

        serde_json::from_slice(body).map_err(|err| match err.classify() {
            Category::Data => RequestError::InvalidField(err.to_string()),
            Category::Syntax | Category::Eof | Category::Io => {
                RequestError::MalformedJson(err.to_string())
            }
        })
    }

    pub fn validate(self) -> Result<ValidatedRun, RequestError> {
        let code = match self.code {
            None => return Err(RequestError::MissingCode),
            Some(code) if code.is_empty() => return Err(RequestError::EmptyCode),
            Some(code) => code,
        };

        Ok(ValidatedRun {
            params: ExecutionParams {
                code,
                options: self.options,
                timeout_secs: self.timeout,
                color: self.color.unwrap_or(false),
            },
            streaming: self.streaming.unwrap_or(false),
        })
    }
}
