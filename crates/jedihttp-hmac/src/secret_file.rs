//! # Secret Handoff File
//!
//! The launching process writes `{"hmac_secret": "<secret>"}` to a temporary
//! file and passes its path to the server. The server reads it once and
//! deletes it, so the secret never lingers on disk.
//!
//! ```rust,ignore
//! let path = write_secret_file("mysecret")?;
//! Command::new("jedihttp").arg("--hmac-file-secret").arg(&path).spawn()?;
//! ```

use crate::errors::ProvisioningError;
use crate::secret::Secret;
use std::io::Write;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// JSON field holding the secret.
pub const SECRET_FIELD: &str = "hmac_secret";

/// Read the secret from `path` and delete the file.
///
/// The file is removed as soon as its bytes are in memory, before parsing, so
/// a malformed file is not left behind either. The raw bytes are wiped once
/// parsed, and the secret string is moved out of the JSON document into the
/// returned [`Secret`] rather than copied.
///
/// # Errors
///
/// - [`ProvisioningError::Io`] if the file cannot be read or removed
/// - [`ProvisioningError::InvalidJson`] if the content is not JSON
/// - [`ProvisioningError::MissingSecret`] if there is no string `hmac_secret` field
pub fn read_secret_file(path: &Path) -> Result<Secret, ProvisioningError> {
    let contents = Zeroizing::new(std::fs::read(path).map_err(|source| {
        ProvisioningError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?);
    std::fs::remove_file(path).map_err(|source| ProvisioningError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut document: serde_json::Value = serde_json::from_slice(&contents)?;
    match document.get_mut(SECRET_FIELD).map(serde_json::Value::take) {
        Some(serde_json::Value::String(secret)) => Ok(Secret::from(secret)),
        _ => Err(ProvisioningError::MissingSecret(SECRET_FIELD)),
    }
}

/// Write `secret` to a fresh temporary file the server will consume.
///
/// The file outlives this call; the server deletes it after reading.
pub fn write_secret_file(secret: &str) -> Result<PathBuf, ProvisioningError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ProvisioningError::Io { path, source }
    };

    let mut file = tempfile::Builder::new()
        .prefix("jedihttp-hmac-")
        .suffix(".json")
        .tempfile()
        .map_err(io_err(&std::env::temp_dir()))?;

    let document = serde_json::json!({ SECRET_FIELD: secret });
    serde_json::to_writer(&mut file, &document)?;
    file.flush().map_err(io_err(file.path()))?;

    let path = file.path().to_path_buf();
    file.into_temp_path()
        .keep()
        .map_err(|e| ProvisioningError::Io {
            path,
            source: e.error,
        })
}
