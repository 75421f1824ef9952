//! Code execution handler: buffered JSON or streamed JSON lines.

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;

use crate::error::ApiError;
use crate::schema::run::RunRequest;
use crate::state::AppState;

/// Validates the body and runs the code.
///
/// Without `_streaming` the response is one `{output, errors, version}`
/// object sent after both processes exited. With `_streaming` the body is
/// a sequence of newline-terminated `{kind, text}` records relayed as the
/// processes write them.
///
/// `POST /runner/{version}/run`
pub async fn run(
    State(state): State<AppState>,
    Path(runner_tag): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let run = RunRequest::from_body(&body)?.validate()?;

    tracing::info!(
        runner = %runner_tag,
        streaming = run.streaming,
        code_bytes = run.params.code.len(),
        "run request"
    );

    if !run.streaming {
        let result = state.runner.run_buffered(&run.params).await?;
        return Ok(Json(result).into_response());
    }

    let frames = state.runner.stream(&run.params)?;
    let lines = frames.map(|frame| frame.to_json_line());

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(lines),
    )
        .into_response())
}
