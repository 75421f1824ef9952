//! Binary entrypoint for the coderunner HTTP server.
//!
//! Configuration comes from `CODERUNNER_*` environment variables (see
//! [`coderunner_server::config`]); log filtering from `RUST_LOG`
//! (default: `info`).

use tracing_subscriber::EnvFilter;

use coderunner_server::config::ServerConfig;
use coderunner_server::router::build_router;
use coderunner_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env().expect("Failed to read configuration");

    let state = AppState::with_body_limit(config.runner.clone(), config.max_body_bytes)
        .expect("Failed to initialize application state");

    let app = build_router(state);

    let addr = config.bind_address();
    tracing::info!(
        toolchain = %config.runner.toolchain,
        timeout_program = %config.runner.timeout_program,
        "coderunner server starting on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
