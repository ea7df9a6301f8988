pub mod error;
mod proxy;
mod ws;

use axum::{
    routing::{get, on, MethodFilter},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::AppState;

/// The verbs the gateway relays. WebSocket upgrades arrive as GET and are
/// branched off inside the handlers.
fn proxy_methods() -> MethodFilter {
    MethodFilter::GET
        .or(MethodFilter::POST)
        .or(MethodFilter::PUT)
        .or(MethodFilter::DELETE)
        .or(MethodFilter::PATCH)
        .or(MethodFilter::OPTIONS)
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let proxy_routes = Router::new()
        .route("/:service", on(proxy_methods(), proxy::proxy_root))
        .route("/:service/*path", on(proxy_methods(), proxy::proxy_path));

    Router::new()
        .route("/api/health", get(health_check))
        .nest(&state.config.proxy.mount, proxy_routes)
        .nest_service(
            "/static",
            ServeDir::new(&state.config.server.static_dir),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
