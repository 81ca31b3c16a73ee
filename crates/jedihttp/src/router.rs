//! Router assembly.
//!
//! ```text
//! RequestSpan → [Auth] → BodyLimit → CatchPanic → routes
//! ```

use crate::analysis::Analyzer;
use crate::domain::config::LimitsConfig;
use crate::domain::error::ApiError;
use crate::handlers::{self, AppState};
use crate::middleware::{AuthLayer, RequestSpanLayer};
use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use jedihttp_hmac::HmacHelper;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

/// Build the application router.
///
/// With `hmac` set every request must come from a local host and carry a
/// valid signature, and every response is signed. Without it the routes are
/// open.
pub fn build_router(
    analyzer: Arc<dyn Analyzer>,
    hmac: Option<Arc<HmacHelper>>,
    limits: &LimitsConfig,
) -> Router {
    let router = Router::new()
        .route("/healthy", post(handlers::healthy))
        .route("/ready", post(handlers::ready))
        .route("/completions", post(handlers::completions))
        .route("/gotodefinition", post(handlers::goto_definition))
        .route("/gotoassignment", post(handlers::goto_assignment))
        .route("/usages", post(handlers::usages))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(DefaultBodyLimit::max(limits.max_body_size))
        .with_state(AppState::new(analyzer));

    let router = match hmac {
        Some(hmac) => router.layer(AuthLayer::new(hmac, limits.max_body_size)),
        None => router,
    };

    router.layer(RequestSpanLayer::new())
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::from_panic(payload.as_ref()).into_response()
}
