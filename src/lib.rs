//! Exchange Signing Proxy
//!
//! A stateless HTTP proxy fronting several crypto-exchange REST APIs for
//! browser clients: it signs requests in-proxy (HMAC-SHA256 or
//! RSA-SHA256-over-MD5), passes caller-computed signature headers through
//! untouched, or forwards anonymously, then relays the upstream response
//! byte-for-byte with a uniform CORS header set.

pub mod config;
pub mod error;
pub mod news;
pub mod server;
pub mod sign;
pub mod upstream;

pub use config::ProxyConfig;
pub use error::ProxyError;
