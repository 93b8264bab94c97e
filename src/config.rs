//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with environment
//! variable support for secrets and the bind address. Every section has
//! sensible defaults so the proxy runs with no config file at all.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::upstream::ExchangeTarget;

const NEWSAPI_DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub server: ServerConfig,
    pub upstreams: UpstreamConfig,
    pub news: NewsConfig,
}

impl ProxyConfig {
    /// Load configuration from a JSON file, or defaults when no file is
    /// given. Environment variables override secrets and the bind address.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: Self = match path {
            Some(path) => {
                let contents =
                    fs::read_to_string(path).context("Failed to read config file")?;
                serde_json::from_str(&contents).context("Failed to parse config JSON")?
            }
            None => Self::default(),
        };

        if let Ok(key) = std::env::var("NEWSAPI_KEY") {
            config.news.api_key = Some(key);
        }
        if let Ok(host) = std::env::var("EXCHANGE_PROXY_BIND") {
            config.server.host = host;
        }

        Ok(config)
    }

    /// Base URL for an exchange target, honoring config overrides.
    pub fn base_url(&self, target: ExchangeTarget) -> &str {
        let configured = match target {
            ExchangeTarget::BingX => &self.upstreams.bingx,
            ExchangeTarget::Bitunix => &self.upstreams.bitunix,
            ExchangeTarget::Bitget => &self.upstreams.bitget,
            ExchangeTarget::LBank => &self.upstreams.lbank,
        };
        configured
            .as_deref()
            .unwrap_or_else(|| target.default_base_url())
    }

    /// Base URL for the news upstream.
    pub fn news_base_url(&self) -> &str {
        self.upstreams
            .newsapi
            .as_deref()
            .unwrap_or(NEWSAPI_DEFAULT_BASE_URL)
    }
}

/// Bind address and HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

/// Per-target base URL overrides; production hosts when unset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bingx: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitunix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lbank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newsapi: Option<String>,
}

/// News proxy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// NewsAPI key. Server-side only; callers never supply or see it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_production_hosts() {
        let config = ProxyConfig::default();
        assert_eq!(
            config.base_url(ExchangeTarget::BingX),
            "https://open-api.bingx.com"
        );
        assert_eq!(
            config.base_url(ExchangeTarget::LBank),
            "https://api.lbank.info"
        );
        assert_eq!(config.news_base_url(), "https://newsapi.org/v2");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn overrides_win_over_defaults() {
        let config: ProxyConfig = serde_json::from_str(
            r#"{
                "server": { "port": 9000 },
                "upstreams": { "bingx": "http://127.0.0.1:1234" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.base_url(ExchangeTarget::BingX),
            "http://127.0.0.1:1234"
        );
        // Untouched sections keep their defaults.
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.base_url(ExchangeTarget::Bitget),
            "https://api.bitget.com"
        );
    }
}
