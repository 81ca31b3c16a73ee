//! Domain types for the JediHTTP server.
//!
//! Wire types, configuration, and error handling.

pub mod config;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use config::{AuthConfig, ConfigError, HttpConfig, LimitsConfig, ServerConfig};
pub use error::{ApiError, ApiResult, ServiceError};
pub use types::*;
