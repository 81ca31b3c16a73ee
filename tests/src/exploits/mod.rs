//! # Attack Simulations
//!
//! Each module plays an attacker against a live server holding the shared
//! secret.
//!
//! - `origin_spoofing` - requests declaring a non-local `Host`
//! - `tampering` - forged, replayed and modified signatures
//! - `timing` - digest comparison as a timing oracle

pub mod tampering;
