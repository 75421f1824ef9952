//! Health check handler.

use axum::extract::State;
use axum::Json;

use crate::schema::health::HealthResponse;
use crate::state::AppState;

/// Reports liveness together with the toolchain version.
///
/// `GET /`, `GET /health`, `GET /healthz`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let version = state.runner.query_version().await;
    Json(HealthResponse::pass(version))
}
