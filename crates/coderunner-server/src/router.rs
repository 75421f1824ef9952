//! Router assembly for the runner HTTP API.
//!
//! [`build_router`] wires handlers to their routes with CORS, tracing and
//! body-limit layers.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router.
///
/// Every path is also served with a trailing slash. A known path hit with
/// the wrong verb answers 400, an unknown path 404. CORS is permissive
/// (playground front-ends call from anywhere).
pub fn build_router(state: AppState) -> Router {
    let health = || get(handlers::health::health).fallback(handlers::fallback::method_not_allowed);
    let run = || post(handlers::run::run).fallback(handlers::fallback::method_not_allowed);

    let routes: [(&str, MethodRouter<AppState>); 4] = [
        ("/", health()),
        ("/health", health()),
        ("/healthz", health()),
        ("/runner/{version}/run", run()),
    ];

    let mut router = Router::new();
    for (path, method_router) in routes {
        if path != "/" {
            router = router.route(&format!("{}/", path), method_router.clone());
        }
        router = router.route(path, method_router);
    }

    router
        .fallback(handlers::fallback::not_found)
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
