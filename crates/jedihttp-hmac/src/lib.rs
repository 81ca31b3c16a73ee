//! # JediHTTP HMAC - Mutual Request/Response Authentication
//!
//! Everything a JediHTTP client or server needs to sign and verify an
//! HTTP exchange with a shared secret.
//!
//! ## Components
//!
//! | Module | Item | Use Case |
//! |--------|------|----------|
//! | `digest` | [`DigestEngine`] | Keyed HMAC-SHA256 over arbitrary bytes |
//! | `helper` | [`HmacHelper`] | Sign/verify requests and responses via `x-jedihttp-hmac` |
//! | `compare` | [`constant_time_eq`] | Digest comparison without timing leaks |
//! | `secret` | [`Secret`] | Shared key, redacted and zeroized |
//! | `secret_file` | [`read_secret_file`] | One-shot secret handoff from the launcher |
//!
//! ## Request Digest
//!
//! ```text
//! D(k, m)  = HMAC-SHA256(k, m)
//! request  = D(k, D(k, method) || D(k, path) || D(k, body))
//! response = D(k, body)
//! ```
//!
//! Each field is hashed on its own before composing, so `("GET", "/ab")`
//! and `("GE", "T/ab")` never produce the same input to the outer MAC.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compare;
pub mod digest;
pub mod errors;
pub mod helper;
pub mod secret;
pub mod secret_file;

// Re-exports
pub use compare::constant_time_eq;
pub use digest::{hmac_sha256, Digest, DigestEngine, DIGEST_LEN};
pub use errors::{CryptoError, ProvisioningError};
pub use helper::{HmacHelper, HMAC_HEADER};
pub use secret::Secret;
pub use secret_file::{read_secret_file, write_secret_file, SECRET_FIELD};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
