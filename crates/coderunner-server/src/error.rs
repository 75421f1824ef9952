//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all endpoints. Error bodies are
//! short plain-text messages, not JSON: clients of the runner only ever parse
//! successful responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use coderunner_exec::ExecError;

/// Why a run request was rejected before any process was spawned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// No body, or only whitespace.
    #[error("request body is empty")]
    EmptyBody,

    /// The body is not JSON at all.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// JSON, but a field has the wrong type or the body is not an object.
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// `code` is absent or null.
    #[error("missing required field 'code'")]
    MissingCode,

    /// `code` is present but empty.
    #[error("field 'code' must not be empty")]
    EmptyCode,

    /// Wrong HTTP verb for the path.
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid request (400).
    #[error("Bad request: {0}")]
    BadRequest(#[from] RequestError),

    /// No route matched (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The runner could not launch the toolchain (500).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

impl From<ExecError> for ApiError {
    fn from(err: ExecError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(RequestError::MissingCode).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("/nope".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        let spawn = ExecError::Spawn {
            program: "timeout".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(ApiError::from(spawn).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_messages_are_short_plain_text() {
        let err = ApiError::from(RequestError::MissingCode);
        assert_eq!(err.to_string(), "Bad request: missing required field 'code'");
    }
}
