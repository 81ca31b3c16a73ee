//! Middleware stack wrapped around the router.
//!
//! Layer order: Request → RequestSpan → Auth (origin, body limit, HMAC) →
//! CatchPanic → Handler
//!
//! The auth layer is only installed when a secret was provisioned.

pub mod auth;
pub mod origin;
pub mod tracing;

pub use auth::{
    check_origin, check_signature, sign_response, AuthDecision, AuthLayer, AuthService,
    RejectReason,
};
pub use origin::{declared_host, is_local_origin, is_local_request, LOCAL_HOSTS};
pub use self::tracing::{RequestSpanLayer, RequestSpanService};
