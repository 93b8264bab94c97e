//! HTTP surface: router, per-target handlers, CORS
//!
//! Each exchange gets one handler implementing its fixed credential
//! convention. The CORS layer is a constant applied to the whole router, so
//! every response path (including errors) carries the same header set.
//! OPTIONS short-circuits with 200 before any routing or validation work.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::any;
use axum::Router;
use chrono::Utc;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::news;
use crate::upstream::credentials::{route_hmac, route_passthrough, HmacRouting};
use crate::upstream::dispatch::dispatch;
use crate::upstream::request::{
    hmac_signed_request, parse_query_pairs, passthrough_request, public_request,
    rsa_form_request, SignedBodyRequest,
};
use crate::upstream::ExchangeTarget;

/// Shared per-request context: one HTTP client for all upstream calls.
#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub config: Arc<ProxyConfig>,
}

/// Build the application router.
pub fn app(config: ProxyConfig) -> anyhow::Result<Router> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.request_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let state = AppState {
        http,
        config: Arc::new(config),
    };

    Ok(Router::new()
        .route("/api/bingx/{*path}", any(proxy_bingx))
        .route("/api/bitunix/{*path}", any(proxy_bitunix))
        .route("/api/proxy-bitget/{*path}", any(proxy_bitget))
        .route("/api/proxy-lbank", any(proxy_lbank))
        .route("/api/news", any(business_news))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state))
}

/// The union of credential headers across all targets, plus Content-Type.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-secret-key"),
            HeaderName::from_static("access-key"),
            HeaderName::from_static("access-sign"),
            HeaderName::from_static("access-timestamp"),
            HeaderName::from_static("access-passphrase"),
        ])
}

async fn proxy_bingx(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    proxy_hmac_target(ExchangeTarget::BingX, state, method, path, query, headers, body).await
}

async fn proxy_bitunix(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    proxy_hmac_target(ExchangeTarget::Bitunix, state, method, path, query, headers, body).await
}

/// Shared flow for the HMAC-convention targets: classify credentials, then
/// either forward anonymously or sign the canonical query in-proxy.
async fn proxy_hmac_target(
    target: ExchangeTarget,
    state: AppState,
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    let path = format!("/{path}");
    let base_url = state.config.base_url(target);
    let body = (!body.is_empty()).then(|| body.to_vec());

    let signed = match route_hmac(&headers)? {
        HmacRouting::Public => public_request(base_url, &path, query.as_deref(), method, body),
        HmacRouting::Signed(credential) => hmac_signed_request(
            base_url,
            &path,
            parse_query_pairs(query.as_deref()),
            &credential,
            Utc::now().timestamp_millis(),
            method,
            body,
        )?,
    };

    dispatch(&state.http, target, signed).await
}

async fn proxy_bitget(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    let auth = route_passthrough(&headers)?;
    let path = format!("/{path}");
    let body = (!body.is_empty()).then(|| body.to_vec());
    let signed = passthrough_request(
        state.config.base_url(ExchangeTarget::Bitget),
        &path,
        query.as_deref(),
        auth,
        method,
        body,
    );

    dispatch(&state.http, ExchangeTarget::Bitget, signed).await
}

async fn proxy_lbank(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Response, ProxyError> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }
    if method != Method::POST {
        return Err(ProxyError::MethodNotAllowed("POST"));
    }

    let request: SignedBodyRequest = serde_json::from_slice(&body)
        .map_err(|e| ProxyError::Validation(format!("invalid JSON body: {e}")))?;
    let signed = rsa_form_request(
        state.config.base_url(ExchangeTarget::LBank),
        request,
        Utc::now().timestamp_millis(),
    )?;

    dispatch(&state.http, ExchangeTarget::LBank, signed).await
}

async fn business_news(
    State(state): State<AppState>,
    method: Method,
) -> Result<Response, ProxyError> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }
    if method != Method::GET {
        return Err(ProxyError::MethodNotAllowed("GET"));
    }

    let api_key = state
        .config
        .news
        .api_key
        .as_deref()
        .ok_or_else(|| ProxyError::Unexpected(anyhow::anyhow!("NEWSAPI_KEY is not configured")))?;

    let articles =
        news::fetch_business_news(&state.http, state.config.news_base_url(), api_key).await?;
    let total = articles.len();

    Ok(Json(json!({
        "success": true,
        "articles": articles,
        "total": total,
    }))
    .into_response())
}
