//! Proxy error taxonomy and HTTP mapping
//!
//! Every error renders as `{"success": false, "error": <message>}` so that
//! browser callers always get a readable JSON body. CORS headers are applied
//! by the router layer, so error responses carry them too.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing or malformed request data. The upstream is never contacted.
    #[error("{0}")]
    Validation(String),

    /// Private key material that cannot be parsed even after the generic
    /// PEM envelope recovery. Never retried, never falls back to another
    /// signing scheme.
    #[error("invalid RSA private key: {0}")]
    CredentialFormat(String),

    /// Wrong HTTP method for a fixed-method route.
    #[error("method not allowed. Use {0}.")]
    MethodNotAllowed(&'static str),

    /// The outbound call itself failed (connect, timeout, TLS). Non-2xx
    /// upstream responses are not errors; the dispatcher relays them.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Anything else. The message is logged server-side; the client gets
    /// a generic body.
    #[error("unexpected error: {0}")]
    Unexpected(anyhow::Error),
}

impl From<anyhow::Error> for ProxyError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unexpected(err)
    }
}

impl ProxyError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::CredentialFormat(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Upstream(_) | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Unexpected(err) => {
                tracing::error!("unexpected proxy error: {err:#}");
                "internal proxy error".to_string()
            }
            Self::Upstream(err) => {
                tracing::error!("upstream call failed: {err}");
                self.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ProxyError::Validation("missing endpoint".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "missing endpoint");
    }

    #[test]
    fn credential_format_maps_to_bad_request() {
        let err = ProxyError::CredentialFormat("bad PEM".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn method_not_allowed_names_the_expected_method() {
        let err = ProxyError::MethodNotAllowed("POST");
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.to_string(), "method not allowed. Use POST.");
    }

    #[test]
    fn unexpected_maps_to_internal_error() {
        let err = ProxyError::Unexpected(anyhow::anyhow!("boom"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
