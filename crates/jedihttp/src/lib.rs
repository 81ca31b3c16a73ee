//! JediHTTP - local code-intelligence server with HMAC authentication.
//!
//! Serves completion, go-to-definition, go-to-assignment and usages over
//! plain HTTP to editors running on the same machine.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         JediHTTP                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  RequestSpan ─→ Auth ─────────────→ CatchPanic ─→ handlers    │
//! │                  │  origin (Host)                    │        │
//! │                  │  body limit                       ↓        │
//! │                  │  HMAC check              spawn_blocking    │
//! │                  │                                   │        │
//! │                  ← sign response ←────────── Analyzer         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Routes
//!
//! All `POST`, all JSON:
//!
//! - `/healthy`, `/ready` - answer `true`
//! - `/completions` - `{completions: [...]}`
//! - `/gotodefinition`, `/gotoassignment`, `/usages` - `{definitions: [...]}`
//!
//! Any handler failure, panics included, is a 500 carrying
//! `{exception, message, traceback}`.
//!
//! # Usage
//!
//! ```ignore
//! use jedihttp::{analysis::LexicalAnalyzer, JediHttpService, ServerConfig};
//!
//! let service = JediHttpService::bind(&ServerConfig::default(), Arc::new(LexicalAnalyzer)).await?;
//! println!("serving on http://{}", service.local_addr()?);
//! service.serve().await?;
//! ```
//!
//! # Security
//!
//! With a secret configured, requests must declare a loopback `Host` and
//! carry `x-jedihttp-hmac`; responses are signed the same way. There is no
//! TLS: the HMAC gives authenticity and integrity, not confidentiality.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

// Re-exports for public API
pub use analysis::{AnalysisError, Analyzer, LexicalAnalyzer};
pub use domain::config::{LimitsConfig, ServerConfig};
pub use domain::error::{ApiError, ApiResult, ServiceError};
pub use domain::types::*;
pub use router::build_router;
pub use service::{JediHttpService, ServerHandle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
