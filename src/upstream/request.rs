//! Outbound request builders
//!
//! Pure functions from request-scoped inputs (stripped path, decoded query
//! pairs, credential, clock) to a fully prepared [`SignedRequest`]. The
//! timestamp is a parameter rather than a clock read so every builder is
//! deterministic.

use axum::http::Method;
use serde::Deserialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::error::ProxyError;
use crate::sign::canonical::{param_value, CanonicalParams};
use crate::sign::{hmac, rsa};
use crate::upstream::credentials::{HmacSecret, PassthroughAuth};

/// Outbound api-key header used by the HMAC targets.
pub const HMAC_API_KEY_HEADER: &str = "X-BX-APIKEY";

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// A fully prepared outbound call, ready for the dispatcher.
#[derive(Debug)]
pub struct SignedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Vec<u8>>,
    pub content_type: &'static str,
}

/// Decode an inbound query string into `(key, value)` pairs.
pub fn parse_query_pairs(raw_query: Option<&str>) -> Vec<(String, String)> {
    match raw_query {
        Some(raw) if !raw.is_empty() => form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Anonymous public call: the inbound query is forwarded untouched and no
/// signature material is attached.
pub fn public_request(
    base_url: &str,
    path: &str,
    raw_query: Option<&str>,
    method: Method,
    body: Option<Vec<u8>>,
) -> SignedRequest {
    let url = match raw_query {
        Some(query) if !query.is_empty() => format!("{base_url}{path}?{query}"),
        _ => format!("{base_url}{path}"),
    };
    SignedRequest {
        method,
        url,
        headers: Vec::new(),
        body,
        content_type: CONTENT_TYPE_JSON,
    }
}

/// Private call to an HMAC target: inject the timestamp, sign the canonical
/// query, and append the signature as an extra query parameter.
pub fn hmac_signed_request(
    base_url: &str,
    path: &str,
    query_pairs: Vec<(String, String)>,
    credential: &HmacSecret,
    timestamp_ms: i64,
    method: Method,
    body: Option<Vec<u8>>,
) -> Result<SignedRequest, ProxyError> {
    let mut params = CanonicalParams::from_pairs(query_pairs)?;
    if params.contains_key("timestamp") {
        return Err(ProxyError::Validation(
            "parameter 'timestamp' is injected by the proxy and must not be supplied".to_string(),
        ));
    }
    params.insert("timestamp", timestamp_ms.to_string())?;

    let canonical = params.to_query_string();
    let signature = hmac::sign(&credential.secret_key, &canonical);
    let url = format!("{base_url}{path}?{canonical}&signature={signature}");

    Ok(SignedRequest {
        method,
        url,
        headers: vec![(HMAC_API_KEY_HEADER, credential.api_key.clone())],
        body,
        content_type: CONTENT_TYPE_JSON,
    })
}

/// Passthrough call: the caller already signed; forward its headers and the
/// query string exactly as received.
pub fn passthrough_request(
    base_url: &str,
    path: &str,
    raw_query: Option<&str>,
    auth: PassthroughAuth,
    method: Method,
    body: Option<Vec<u8>>,
) -> SignedRequest {
    let url = match raw_query {
        Some(query) if !query.is_empty() => format!("{base_url}{path}?{query}"),
        _ => format!("{base_url}{path}"),
    };
    SignedRequest {
        method,
        url,
        headers: vec![
            ("ACCESS-KEY", auth.api_key),
            ("ACCESS-SIGN", auth.signature),
            ("ACCESS-TIMESTAMP", auth.timestamp),
            ("ACCESS-PASSPHRASE", auth.passphrase),
            ("locale", "en-US".to_string()),
        ],
        body,
        content_type: CONTENT_TYPE_JSON,
    }
}

/// Inbound body for the body-credential target.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedBodyRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub params: Option<serde_json::Map<String, Value>>,
    /// Caller-supplied timestamp (string or number); proxy clock otherwise.
    #[serde(default)]
    pub timestamp: Option<Value>,
}

/// RSA-signed form call: canonicalize params plus the injected identity
/// fields, sign with the caller's private key, and merge the signature into
/// a form-encoded body.
pub fn rsa_form_request(
    base_url: &str,
    request: SignedBodyRequest,
    timestamp_ms: i64,
) -> Result<SignedRequest, ProxyError> {
    let missing = || {
        ProxyError::Validation("missing apiKey, privateKey or endpoint in request body".to_string())
    };
    let api_key = request.api_key.filter(|v| !v.is_empty()).ok_or_else(missing)?;
    let private_key = request
        .private_key
        .filter(|v| !v.is_empty())
        .ok_or_else(missing)?;
    let endpoint = request.endpoint.filter(|v| !v.is_empty()).ok_or_else(missing)?;
    if !endpoint.starts_with('/') {
        return Err(ProxyError::Validation(
            "endpoint must be an absolute path starting with '/'".to_string(),
        ));
    }

    let timestamp = match &request.timestamp {
        Some(value) => param_value("timestamp", value)?,
        None => timestamp_ms.to_string(),
    };

    let mut params = CanonicalParams::new();
    if let Some(caller_params) = &request.params {
        for (key, value) in caller_params {
            if matches!(key.as_str(), "api_key" | "timestamp" | "sign_type" | "sign") {
                return Err(ProxyError::Validation(format!(
                    "parameter '{key}' is injected by the proxy and must not be supplied"
                )));
            }
            params.insert(key.clone(), param_value(key, value)?)?;
        }
    }
    params.insert("api_key", api_key)?;
    params.insert("timestamp", timestamp)?;
    params.insert("sign_type", "RSA")?;

    let canonical = params.to_query_string();
    let signature = rsa::sign(&private_key, &canonical)?;

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params.into_pairs() {
        serializer.append_pair(&key, &value);
    }
    serializer.append_pair("sign", &signature);
    let body = serializer.finish().into_bytes();

    Ok(SignedRequest {
        method: Method::POST,
        url: format!("{base_url}{endpoint}"),
        headers: Vec::new(),
        body: Some(body),
        content_type: CONTENT_TYPE_FORM,
    })
}
