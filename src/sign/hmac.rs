//! HMAC-SHA256 signing for shared-secret exchanges
//!
//! BingX and Bitunix expect the canonical query string signed with the
//! account secret and appended as a lowercase hex `signature` parameter.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Sign a canonical string with the account secret; lowercase hex output.
pub fn sign(secret: &str, canonical: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(canonical.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a signature against the expected value in constant time.
pub fn verify(secret: &str, canonical: &str, signature: &str) -> bool {
    let computed = sign(secret, canonical);
    constant_time_eq(computed.as_bytes(), signature.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
