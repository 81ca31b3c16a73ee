//! Error types for signing and secret provisioning.

use std::path::PathBuf;
use thiserror::Error;

/// Signing and verification errors.
///
/// Verification itself never errors (it answers `bool`); these cover the
/// decoding steps callers may want to inspect.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// HMAC header is not present
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    /// HMAC header is not visible ASCII
    #[error("HMAC header is not valid ASCII")]
    InvalidHeaderEncoding,

    /// HMAC header is not valid base64
    #[error("HMAC header is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Errors raised while handing the shared secret over through a file.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// Reading, writing or removing the file failed
    #[error("secret file {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File content is not a JSON document
    #[error("a JSON object was expected for the secret exchange: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// JSON document has no string field holding the secret
    #[error("a JSON object with a string field named '{0}' was expected for the secret exchange")]
    MissingSecret(&'static str),
}
