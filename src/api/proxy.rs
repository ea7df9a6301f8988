//! Proxy entry handlers.
//!
//! One route shape serves every verb plus WebSocket upgrades:
//! `/{service}` and `/{service}/{subpath...}` under the configured mount.

use axum::{
    body::Body,
    extract::{Path, State, WebSocketUpgrade},
    http::{header, Request},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::error::ProxyError;
use super::ws;
use crate::proxy::{inject, rewrite, target};
use crate::AppState;

/// `GET/... {mount}/{service}` — bare service root.
pub async fn proxy_root(
    State(state): State<Arc<AppState>>,
    Path(service): Path<String>,
    upgrade: Option<WebSocketUpgrade>,
    req: Request<Body>,
) -> Result<Response, ProxyError> {
    handle(state, service, String::new(), upgrade, req).await
}

/// `GET/... {mount}/{service}/{subpath...}`.
pub async fn proxy_path(
    State(state): State<Arc<AppState>>,
    Path((service, subpath)): Path<(String, String)>,
    upgrade: Option<WebSocketUpgrade>,
    req: Request<Body>,
) -> Result<Response, ProxyError> {
    handle(state, service, subpath, upgrade, req).await
}

async fn handle(
    state: Arc<AppState>,
    service: String,
    subpath: String,
    upgrade: Option<WebSocketUpgrade>,
    req: Request<Body>,
) -> Result<Response, ProxyError> {
    // WebSocket upgrades are accepted before the service is resolved; a
    // failed lookup then closes the fresh socket with a policy-violation
    // code instead of refusing the handshake.
    if let Some(upgrade) = upgrade {
        return Ok(upgrade
            .on_upgrade(move |socket| ws::tunnel(socket, state, service, subpath))
            .into_response());
    }

    let descriptor = state
        .registry
        .lookup(&service)
        .await
        .map_err(ProxyError::Registry)?
        .filter(|s| s.enabled)
        .ok_or_else(|| ProxyError::ServiceNotFound(service.clone()))?;

    let (parts, body) = req.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(ProxyError::BodyRead)?;

    let url = target::http_target(&descriptor.base_url, &subpath, parts.uri.query());
    let upstream = state
        .forwarder
        .forward(parts.method, &url, &parts.headers, body)
        .await?;

    debug!(service = %service, status = %upstream.status, "Upstream responded");

    let prefix = state.config.proxy.path_prefix(&service);
    let headers = rewrite::response_headers(&upstream.headers, &prefix);

    let body = if inject::is_html(upstream.headers.get(header::CONTENT_TYPE)) {
        inject::inject_script(upstream.body, &state.config.proxy.injection_tag())
    } else {
        upstream.body
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = headers;
    Ok(response)
}
