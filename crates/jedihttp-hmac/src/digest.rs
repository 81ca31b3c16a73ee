//! # HMAC-SHA256 Digest Engine
//!
//! Keyed message digest (RFC 2104 with SHA-256 as the inner hash).
//!
//! The engine keys the MAC once; every call to [`DigestEngine::digest`]
//! clones the prepared state instead of re-deriving the inner and outer pads.
//!
//! The prepared pads are derived from the key and live as long as the engine.
//! `hmac` does not wipe them on drop; only the [`Secret`](crate::Secret) the
//! engine was keyed from is zeroized.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Output length of HMAC-SHA256 in bytes.
pub const DIGEST_LEN: usize = 32;

/// HMAC-SHA256 output (256-bit).
pub type Digest = [u8; DIGEST_LEN];

/// HMAC-SHA256 keyed with a fixed secret.
#[derive(Clone)]
pub struct DigestEngine {
    keyed: HmacSha256,
}

impl DigestEngine {
    /// Key a new engine. HMAC accepts keys of any length, including empty.
    pub fn new(key: &[u8]) -> Self {
        Self {
            keyed: HmacSha256::new_from_slice(key).expect("HMAC can take key of any size"),
        }
    }

    /// Digest a single message.
    pub fn digest(&self, message: &[u8]) -> Digest {
        self.digest_parts(&[message])
    }

    /// Digest the concatenation of several parts without allocating it.
    pub fn digest_parts(&self, parts: &[&[u8]]) -> Digest {
        let mut mac = self.keyed.clone();
        for part in parts {
            mac.update(part);
        }
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }
}

impl std::fmt::Debug for DigestEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestEngine").finish_non_exhaustive()
    }
}

/// One-shot HMAC-SHA256.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Digest {
    DigestEngine::new(key).digest(message)
}
