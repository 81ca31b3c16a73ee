//! HMAC authentication middleware.
//!
//! Wraps the whole router. Per request:
//!
//! 1. **Origin** - the declared `Host` must be loopback, else 401
//! 2. **Body** - buffered up to the configured limit, else 413
//! 3. **Signature** - `x-jedihttp-hmac` must match method, path and body, else 401
//! 4. **Response** - whatever the router produced, errors included, is
//!    buffered and signed
//!
//! Both 401s carry the same generic body so a client cannot tell which check
//! failed. Rejections are not signed.

use crate::domain::error::ApiError;
use crate::middleware::origin::{declared_host, is_local_request};
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_LENGTH, request::Parts, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jedihttp_hmac::HmacHelper;
use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, info, warn};

/// Outcome of checking one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// Passed this check
    Authenticated,
    /// Answered 401 without reaching the router
    Rejected(RejectReason),
}

/// Why a request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// `Host` is not `127.0.0.1` or `localhost`
    NonLocalHost,
    /// `x-jedihttp-hmac` missing, undecodable or wrong
    BadHmac,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NonLocalHost => f.write_str("non-local Host header"),
            RejectReason::BadHmac => f.write_str("bad HMAC"),
        }
    }
}

/// Origin half of the check, run before the body is read.
pub fn check_origin(parts: &Parts) -> AuthDecision {
    if is_local_request(&parts.headers, &parts.uri) {
        AuthDecision::Authenticated
    } else {
        AuthDecision::Rejected(RejectReason::NonLocalHost)
    }
}

/// Signature half of the check. The query string is not part of the signed path.
pub fn check_signature(hmac: &HmacHelper, parts: &Parts, body: &[u8]) -> AuthDecision {
    if hmac.is_request_authenticated(
        &parts.headers,
        parts.method.as_str(),
        parts.uri.path(),
        body,
    ) {
        AuthDecision::Authenticated
    } else {
        AuthDecision::Rejected(RejectReason::BadHmac)
    }
}

/// Layer installing [`AuthService`]
#[derive(Clone)]
pub struct AuthLayer {
    hmac: Arc<HmacHelper>,
    max_body_size: usize,
}

impl AuthLayer {
    /// Gate requests with `hmac`, buffering at most `max_body_size` bytes.
    pub fn new(hmac: Arc<HmacHelper>, max_body_size: usize) -> Self {
        Self {
            hmac,
            max_body_size,
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            hmac: Arc::clone(&self.hmac),
            max_body_size: self.max_body_size,
        }
    }
}

/// Request gate and response signer
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    hmac: Arc<HmacHelper>,
    max_body_size: usize,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let hmac = Arc::clone(&self.hmac);
        let max_body_size = self.max_body_size;

        Box::pin(async move {
            let (parts, body) = req.into_parts();

            if let AuthDecision::Rejected(reason) = check_origin(&parts) {
                log_rejection(&parts, reason);
                return Ok(unauthorized_response());
            }

            if declared_length(&parts).is_some_and(|len| len > max_body_size) {
                warn!(max = max_body_size, "request body too large (from header)");
                return Ok(payload_too_large_response(max_body_size));
            }
            let body = match to_bytes(body, max_body_size).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, max = max_body_size, "failed to read request body");
                    return Ok(payload_too_large_response(max_body_size));
                }
            };

            if let AuthDecision::Rejected(reason) = check_signature(&hmac, &parts, &body) {
                log_rejection(&parts, reason);
                return Ok(unauthorized_response());
            }
            debug!(method = %parts.method, path = parts.uri.path(), "request authenticated");

            let response = inner.call(Request::from_parts(parts, Body::from(body))).await?;
            Ok(sign_response(&hmac, response).await)
        })
    }
}

/// Buffer `response` and attach its HMAC header.
///
/// A body that cannot be buffered is replaced by a signed 500.
pub async fn sign_response(hmac: &HmacHelper, response: Response) -> Response {
    let (mut parts, body) = response.into_parts();
    let body = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let (error_parts, error_body) = ApiError::Internal(format!(
                "failed to buffer response body: {}",
                e
            ))
            .into_response()
            .into_parts();
            parts = error_parts;
            // Rendered from a Json value, so buffering cannot fail.
            to_bytes(error_body, usize::MAX).await.unwrap_or_default()
        }
    };

    hmac.sign_response_headers(&mut parts.headers, &body);
    Response::from_parts(parts, Body::from(body))
}

fn declared_length(parts: &Parts) -> Option<usize> {
    parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn log_rejection(parts: &Parts, reason: RejectReason) {
    info!(
        reason = %reason,
        method = %parts.method,
        path = parts.uri.path(),
        host = declared_host(&parts.headers, &parts.uri).as_deref().unwrap_or("<none>"),
        "dropping request"
    );
}

/// Same body for every rejection
fn unauthorized_response() -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "message": "Unauthorized" })),
    )
        .into_response();
    response
        .headers_mut()
        .insert("WWW-Authenticate", HeaderValue::from_static("HMAC"));
    response
}

fn payload_too_large_response(max: usize) -> Response {
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(serde_json::json!({
            "message": format!("request body exceeds {} bytes", max)
        })),
    )
        .into_response()
}
