//! # Request/Response Signing
//!
//! Builds the signable form of an HTTP exchange and signs or verifies it.
//!
//! ## Signable Form
//!
//! - **Request**: method, path (no host, no query) and raw body. An absent
//!   body is the empty byte string.
//! - **Response**: raw body only.
//!
//! Both sides must feed exactly the bytes seen on the wire; nothing is
//! normalized.

use crate::compare::constant_time_eq;
use crate::digest::{Digest, DigestEngine};
use crate::errors::CryptoError;
use crate::secret::Secret;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::header::{HeaderMap, HeaderName, HeaderValue};

/// Header carrying `base64(HMAC-SHA256)` on requests and responses.
pub const HMAC_HEADER: &str = "x-jedihttp-hmac";

/// Signs and verifies JediHTTP exchanges with one shared secret.
///
/// Holds no per-request state, so one instance can be shared across every
/// worker behind an `Arc`.
#[derive(Debug, Clone)]
pub struct HmacHelper {
    engine: DigestEngine,
}

impl HmacHelper {
    /// Create a helper for `secret`.
    pub fn new(secret: impl Into<Secret>) -> Self {
        let secret = secret.into();
        Self {
            engine: DigestEngine::new(secret.as_bytes()),
        }
    }

    /// `D(D(method) || D(path) || D(body))`.
    pub fn compute_request_digest(&self, method: &str, path: &str, body: &[u8]) -> Digest {
        let method = self.engine.digest(method.as_bytes());
        let path = self.engine.digest(path.as_bytes());
        let body = self.engine.digest(body);
        self.engine.digest_parts(&[&method[..], &path[..], &body[..]])
    }

    /// `D(body)`.
    pub fn compute_response_digest(&self, body: &[u8]) -> Digest {
        self.engine.digest(body)
    }

    /// Set the HMAC header for an outgoing request.
    pub fn sign_request_headers(
        &self,
        headers: &mut HeaderMap,
        method: &str,
        path: &str,
        body: &[u8],
    ) {
        set_hmac_header(headers, &self.compute_request_digest(method, path, body));
    }

    /// Set the HMAC header for an outgoing response.
    pub fn sign_response_headers(&self, headers: &mut HeaderMap, body: &[u8]) {
        set_hmac_header(headers, &self.compute_response_digest(body));
    }

    /// Check an incoming request. A missing or undecodable header is a failure.
    pub fn is_request_authenticated(
        &self,
        headers: &HeaderMap,
        method: &str,
        path: &str,
        body: &[u8],
    ) -> bool {
        match hmac_header(headers) {
            Ok(received) => constant_time_eq(
                &received,
                &self.compute_request_digest(method, path, body),
            ),
            Err(_) => false,
        }
    }

    /// Check an incoming response. A missing or undecodable header is a failure.
    pub fn is_response_authenticated(&self, headers: &HeaderMap, body: &[u8]) -> bool {
        match hmac_header(headers) {
            Ok(received) => constant_time_eq(&received, &self.compute_response_digest(body)),
            Err(_) => false,
        }
    }
}

/// Decode the HMAC header value.
pub fn hmac_header(headers: &HeaderMap) -> Result<Vec<u8>, CryptoError> {
    let value = headers
        .get(HMAC_HEADER)
        .ok_or(CryptoError::MissingHeader(HMAC_HEADER))?;
    let value = value
        .to_str()
        .map_err(|_| CryptoError::InvalidHeaderEncoding)?;
    Ok(STANDARD.decode(value)?)
}

fn set_hmac_header(headers: &mut HeaderMap, digest: &Digest) {
    // Standard base64 only produces visible ASCII, which is always a valid header value.
    let encoded = STANDARD.encode(digest);
    if let Ok(value) = HeaderValue::from_str(&encoded) {
        headers.insert(HeaderName::from_static(HMAC_HEADER), value);
    }
}
