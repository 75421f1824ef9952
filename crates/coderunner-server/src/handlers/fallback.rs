//! Responses for requests no handler accepts.

use axum::http::{Method, Uri};

use crate::error::{ApiError, RequestError};

/// Known path, wrong verb: 400 rather than axum's default 405.
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::BadRequest(RequestError::MethodNotAllowed(method.to_string()))
}

/// No route matched.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
