//! Upstream HTTP forwarding.

use axum::http::{header, HeaderMap, Method, StatusCode};
use bytes::Bytes;
use reqwest::redirect;
use std::time::Duration;
use tracing::debug;

/// A fully buffered upstream response, before any rewriting.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Pooled HTTP client for the upstream leg.
///
/// Redirects are never followed: 3xx responses relay to the browser after
/// Location rewriting. There is no overall request timeout since long
/// downloads and slow media endpoints must run to completion, but connects
/// that hang are still bounded.
#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client configuration is static");
        Self { client }
    }

    /// Forward one request to `target` and buffer the response.
    ///
    /// The inbound `Host` header is stripped so the upstream sees its own
    /// authority; the framing headers are dropped and recomputed for the
    /// buffered body. Everything else, cookies included, goes through.
    pub async fn forward(
        &self,
        method: Method,
        target: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, reqwest::Error> {
        let mut outbound = headers.clone();
        outbound.remove(header::HOST);
        outbound.remove(header::CONTENT_LENGTH);
        outbound.remove(header::TRANSFER_ENCODING);

        debug!(method = %method, target = %target, "Forwarding to upstream");

        let response = self
            .client
            .request(method, target)
            .headers(outbound)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

impl Default for Forwarder {
    fn default() -> Self {
        Self::new()
    }
}
