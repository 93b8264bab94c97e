//! Request signing: canonical string assembly and the two signature schemes
//!
//! The exchanges covered by this proxy use two unrelated signing conventions.
//! The schemes are kept structurally separate so each can be tested and
//! evolved on its own; no key material or intermediate state crosses between
//! them.

pub mod canonical;
pub mod hmac;
pub mod rsa;

pub use canonical::CanonicalParams;
