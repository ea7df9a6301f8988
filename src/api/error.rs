//! Proxy error taxonomy and its client-visible mapping.
//!
//! Every forwarding failure resolves to a status code and a stable machine
//! code here; nothing escapes a handler as an unhandled fault.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("service '{0}' not found or disabled")]
    ServiceNotFound(String),

    #[error("upstream unreachable: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    #[error("registry lookup failed: {0}")]
    Registry(#[source] anyhow::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ServiceNotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::BodyRead(_) => StatusCode::BAD_REQUEST,
            Self::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::ServiceNotFound(_) => "service_not_found",
            Self::Upstream(_) => "upstream_unreachable",
            Self::BodyRead(_) => "bad_request",
            Self::Registry(_) => "internal_error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Proxy request failed");
        }
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ProxyError::ServiceNotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ProxyError::Registry(anyhow::anyhow!("db gone")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message_names_the_service() {
        let err = ProxyError::ServiceNotFound("sonarr".into());
        assert_eq!(err.to_string(), "service 'sonarr' not found or disabled");
    }
}
