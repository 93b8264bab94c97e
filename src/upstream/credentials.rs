//! Credential routing for inbound requests
//!
//! Classifies the inbound header set against the target's fixed credential
//! convention. Exactly one convention is active per target; nothing here
//! probes alternate schemes. Key material is request-scoped and never
//! logged; these types deliberately do not derive `Debug`.

use axum::http::HeaderMap;

use crate::error::ProxyError;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const SECRET_KEY_HEADER: &str = "x-secret-key";

pub const ACCESS_KEY_HEADER: &str = "access-key";
pub const ACCESS_SIGN_HEADER: &str = "access-sign";
pub const ACCESS_TIMESTAMP_HEADER: &str = "access-timestamp";
pub const ACCESS_PASSPHRASE_HEADER: &str = "access-passphrase";

/// Shared-secret credential for in-proxy HMAC signing.
pub struct HmacSecret {
    pub api_key: String,
    pub secret_key: String,
}

/// How an HMAC-capable target handles this particular request.
pub enum HmacRouting {
    /// No credentials at all: forward as an anonymous public call.
    Public,
    /// Both credential headers present: sign in-proxy.
    Signed(HmacSecret),
}

/// Classify a request against an HMAC target.
///
/// Supplying exactly one of the two headers is rejected rather than being
/// silently downgraded to a public call: a typo'd header name must not turn
/// a private request into an anonymous one.
pub fn route_hmac(headers: &HeaderMap) -> Result<HmacRouting, ProxyError> {
    let api_key = header_value(headers, API_KEY_HEADER)?;
    let secret_key = header_value(headers, SECRET_KEY_HEADER)?;

    match (api_key, secret_key) {
        (Some(api_key), Some(secret_key)) => Ok(HmacRouting::Signed(HmacSecret {
            api_key,
            secret_key,
        })),
        (None, None) => Ok(HmacRouting::Public),
        _ => Err(ProxyError::Validation(format!(
            "both {API_KEY_HEADER} and {SECRET_KEY_HEADER} headers are required for a private call"
        ))),
    }
}

/// Caller-computed signature headers, forwarded verbatim.
pub struct PassthroughAuth {
    pub api_key: String,
    pub signature: String,
    pub timestamp: String,
    pub passphrase: String,
}

/// Extract the four-header passthrough set. The signature was computed by
/// the caller; the proxy never re-derives or overrides it.
pub fn route_passthrough(headers: &HeaderMap) -> Result<PassthroughAuth, ProxyError> {
    let missing_error = || {
        ProxyError::Validation(
            "missing authentication headers (ACCESS-KEY, ACCESS-SIGN, ACCESS-TIMESTAMP, \
             ACCESS-PASSPHRASE)"
                .to_string(),
        )
    };

    let api_key = header_value(headers, ACCESS_KEY_HEADER)?.ok_or_else(missing_error)?;
    let signature = header_value(headers, ACCESS_SIGN_HEADER)?.ok_or_else(missing_error)?;
    let timestamp = header_value(headers, ACCESS_TIMESTAMP_HEADER)?.ok_or_else(missing_error)?;
    let passphrase = header_value(headers, ACCESS_PASSPHRASE_HEADER)?.ok_or_else(missing_error)?;

    Ok(PassthroughAuth {
        api_key,
        signature,
        timestamp,
        passphrase,
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Result<Option<String>, ProxyError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.to_string()))
            .map_err(|_| ProxyError::Validation(format!("header {name} is not valid UTF-8"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn no_credentials_routes_public() {
        let routing = route_hmac(&HeaderMap::new()).unwrap();
        assert!(matches!(routing, HmacRouting::Public));
    }

    #[test]
    fn full_credentials_route_signed() {
        let map = headers(&[(API_KEY_HEADER, "ak"), (SECRET_KEY_HEADER, "sk")]);
        match route_hmac(&map).unwrap() {
            HmacRouting::Signed(secret) => {
                assert_eq!(secret.api_key, "ak");
                assert_eq!(secret.secret_key, "sk");
            }
            HmacRouting::Public => panic!("expected signed routing"),
        }
    }

    #[test]
    fn partial_credentials_are_rejected() {
        let only_key = headers(&[(API_KEY_HEADER, "ak")]);
        assert!(matches!(
            route_hmac(&only_key),
            Err(ProxyError::Validation(_))
        ));

        let only_secret = headers(&[(SECRET_KEY_HEADER, "sk")]);
        assert!(matches!(
            route_hmac(&only_secret),
            Err(ProxyError::Validation(_))
        ));
    }

    #[test]
    fn passthrough_requires_all_four_headers() {
        let map = headers(&[
            (ACCESS_KEY_HEADER, "ak"),
            (ACCESS_SIGN_HEADER, "sig"),
            (ACCESS_TIMESTAMP_HEADER, "1700000000000"),
        ]);
        assert!(matches!(
            route_passthrough(&map),
            Err(ProxyError::Validation(_))
        ));
    }

    #[test]
    fn passthrough_extracts_all_four_headers() {
        let map = headers(&[
            (ACCESS_KEY_HEADER, "ak"),
            (ACCESS_SIGN_HEADER, "sig"),
            (ACCESS_TIMESTAMP_HEADER, "1700000000000"),
            (ACCESS_PASSPHRASE_HEADER, "pass"),
        ]);
        let auth = route_passthrough(&map).unwrap();
        assert_eq!(auth.api_key, "ak");
        assert_eq!(auth.signature, "sig");
        assert_eq!(auth.timestamp, "1700000000000");
        assert_eq!(auth.passphrase, "pass");
    }
}
