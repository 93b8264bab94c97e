//! Upstream dispatcher
//!
//! One outbound call per inbound request, no retries. The upstream's status
//! and payload are relayed byte-for-byte; this layer never interprets or
//! reshapes upstream bodies. Failures surface immediately as 500-class
//! responses built by the error type.

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;

use crate::error::ProxyError;
use crate::upstream::request::SignedRequest;
use crate::upstream::ExchangeTarget;

/// Perform the outbound call and relay the upstream response verbatim.
pub async fn dispatch(
    client: &reqwest::Client,
    target: ExchangeTarget,
    request: SignedRequest,
) -> Result<Response, ProxyError> {
    tracing::info!(
        exchange = target.id(),
        method = %request.method,
        "forwarding request upstream"
    );

    let mut outbound = client
        .request(request.method, &request.url)
        .header(CONTENT_TYPE, request.content_type);
    for (name, value) in request.headers {
        outbound = outbound.header(name, value);
    }
    if let Some(body) = request.body {
        outbound = outbound.body(body);
    }

    let upstream = outbound.send().await?;
    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let bytes = upstream.bytes().await?;

    if !status.is_success() {
        tracing::warn!(
            exchange = target.id(),
            status = %status,
            "relaying upstream error response"
        );
    }

    let mut response = Response::builder().status(status);
    if let Some(content_type) = content_type {
        response = response.header(CONTENT_TYPE, content_type);
    }
    response
        .body(Body::from(bytes))
        .map_err(|e| ProxyError::Unexpected(anyhow::Error::new(e)))
}
