//! # JediHTTP Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/      # Criterion bodies (HMAC overhead, analysis latency)
//! ├── exploits/        # Attack simulations against a live server
//! │   ├── origin_spoofing.rs
//! │   ├── tampering.rs
//! │   └── timing.rs
//! ├── integration/     # End-to-end flows over TCP
//! └── support.rs       # Test server and signing client
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p jedihttp-tests
//!
//! # By category
//! cargo test -p jedihttp-tests integration::
//! cargo test -p jedihttp-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p jedihttp-tests
//! ```

#![allow(dead_code)]

pub mod exploits;
pub mod support;
