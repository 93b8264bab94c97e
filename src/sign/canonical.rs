//! Canonical query string builder
//!
//! Exchanges sign the exact string `k1=v1&k2=v2&...` with keys sorted
//! ascending by byte comparison and values taken raw (no URL-encoding).
//! The builder is a pure function over its inputs; order of insertion
//! never affects the output.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ProxyError;

/// An ordered parameter set destined for a signature.
///
/// Duplicate keys are rejected at insertion: last-write-wins would let two
/// different inbound requests produce the same signed string, which is
/// exactly what a signing contract must not allow.
#[derive(Debug, Clone, Default)]
pub struct CanonicalParams {
    params: BTreeMap<String, String>,
}

impl CanonicalParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, rejecting duplicates.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ProxyError> {
        let key = key.into();
        if self.params.contains_key(&key) {
            return Err(ProxyError::Validation(format!(
                "duplicate query parameter '{key}'"
            )));
        }
        self.params.insert(key, value.into());
        Ok(())
    }

    /// Build from decoded `(key, value)` pairs in arbitrary order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ProxyError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.insert(key, value)?;
        }
        Ok(params)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// The exact string a signature is computed over.
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Sorted pairs, for callers that need to re-encode (form bodies).
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.params.into_iter().collect()
    }
}

/// Render a JSON parameter value the way the canonical string expects it:
/// strings verbatim, numbers and bools in plain decimal form. Structured
/// values have no canonical rendering and are rejected.
pub fn param_value(key: &str, value: &Value) -> Result<String, ProxyError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ProxyError::Validation(format!(
            "parameter '{key}' must be a string, number or bool"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_sorted_by_byte_order() {
        let params =
            CanonicalParams::from_pairs([("symbol", "BTCUSDT"), ("coin", "USDT"), ("side", "BUY")])
                .unwrap();
        assert_eq!(
            params.to_query_string(),
            "coin=USDT&side=BUY&symbol=BTCUSDT"
        );
    }

    #[test]
    fn output_is_stable_under_input_permutation() {
        let a = CanonicalParams::from_pairs([("b", "2"), ("a", "1"), ("c", "3")]).unwrap();
        let b = CanonicalParams::from_pairs([("c", "3"), ("a", "1"), ("b", "2")]).unwrap();
        assert_eq!(a.to_query_string(), b.to_query_string());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let result = CanonicalParams::from_pairs([("coin", "USDT"), ("coin", "BTC")]);
        assert!(matches!(result, Err(ProxyError::Validation(_))));
    }

    #[test]
    fn values_are_not_url_encoded() {
        let params = CanonicalParams::from_pairs([("pair", "btc_usdt"), ("note", "a b&c")]).unwrap();
        assert_eq!(params.to_query_string(), "note=a b&c&pair=btc_usdt");
    }

    #[test]
    fn empty_set_renders_empty_string() {
        assert_eq!(CanonicalParams::new().to_query_string(), "");
    }

    #[test]
    fn uppercase_sorts_before_lowercase() {
        // Byte-ordinal comparison, not locale collation.
        let params = CanonicalParams::from_pairs([("a", "1"), ("B", "2")]).unwrap();
        assert_eq!(params.to_query_string(), "B=2&a=1");
    }

    #[test]
    fn json_values_render_raw() {
        assert_eq!(param_value("q", &json!("spot")).unwrap(), "spot");
        assert_eq!(param_value("size", &json!(10)).unwrap(), "10");
        assert_eq!(param_value("price", &json!(0.5)).unwrap(), "0.5");
        assert_eq!(param_value("reduce", &json!(true)).unwrap(), "true");
    }

    #[test]
    fn structured_json_values_are_rejected() {
        assert!(param_value("filter", &json!({"a": 1})).is_err());
        assert!(param_value("list", &json!([1, 2])).is_err());
        assert!(param_value("nothing", &json!(null)).is_err());
    }
}
