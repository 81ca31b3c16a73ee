//! Error types and the single place handler errors become HTTP responses.
//!
//! Authentication failures are not represented here: the auth layer answers
//! them with 401 itself and they never reach a handler.

use crate::analysis::AnalysisError;
use crate::domain::config::ConfigError;
use crate::domain::types::ErrorBody;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jedihttp_hmac::ProvisioningError;
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt::Write as _;

/// Error raised while serving a route.
///
/// Every variant is reported as HTTP 500 with an [`ErrorBody`] naming the
/// error kind, its message and the cause chain.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body is not the JSON the route expects
    #[error("invalid request body: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    /// Analysis engine rejected the request
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Handler panicked
    #[error("handler panicked: {0}")]
    Panic(String),

    /// Anything else that went wrong while serving
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Short kind name reported as `exception`.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "InvalidRequest",
            ApiError::Analysis(e) => e.kind(),
            ApiError::Panic(_) => "Panic",
            ApiError::Internal(_) => "InternalError",
        }
    }

    /// Build a [`ApiError::Panic`] from a caught panic payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        ApiError::Panic(message)
    }

    /// Render the `{exception, message, traceback}` body.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            exception: self.kind().to_string(),
            message: self.to_string(),
            traceback: traceback(self),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(exception = self.kind(), error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self.to_body())).into_response()
    }
}

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Cause chain, one line per level, followed by a backtrace when
/// `RUST_BACKTRACE` enables capturing.
fn traceback(err: &(dyn StdError + 'static)) -> String {
    let mut out = String::new();
    let mut current = Some(err);
    let mut depth = 0;
    while let Some(e) = current {
        let _ = writeln!(out, "{}: {}", depth, e);
        current = e.source();
        depth += 1;
    }

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        let _ = write!(out, "\n{}", backtrace);
    }
    out
}

/// Server-level errors (startup and serving, not per request)
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration rejected by validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Secret file could not be consumed
    #[error("secret provisioning failed: {0}")]
    Provisioning(#[from] ProvisioningError),

    /// Listener socket could not be bound
    #[error("server bind error: {0}")]
    Bind(#[source] std::io::Error),

    /// Server loop failed
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
