//! Local-origin check.
//!
//! Only the declared `Host` is inspected, never the socket peer. A client
//! able to reach the port and willing to lie about `Host` passes this check;
//! the HMAC check behind it is what actually authenticates.

use axum::http::{header::HOST, uri::Authority, HeaderMap, Uri};

/// Hosts accepted as local.
pub const LOCAL_HOSTS: [&str; 2] = ["127.0.0.1", "localhost"];

/// Whether a `Host` value names the loopback interface.
///
/// The port is ignored and the comparison is case-insensitive. Anything that
/// does not parse as a URI authority is not local.
pub fn is_local_origin(host: &str) -> bool {
    let Ok(authority) = host.trim().parse::<Authority>() else {
        return false;
    };
    let hostname = authority.host().to_ascii_lowercase();
    LOCAL_HOSTS.contains(&hostname.as_str())
}

/// Declared host of a request.
///
/// Falls back to the URI authority for requests that carry none in the
/// headers (HTTP/2 `:authority`).
pub fn declared_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    if let Some(value) = headers.get(HOST) {
        return value.to_str().ok().map(str::to_owned);
    }
    uri.authority().map(|a| a.as_str().to_owned())
}

/// Whether a request declares a local host. A request without one is not local.
pub fn is_local_request(headers: &HeaderMap, uri: &Uri) -> bool {
    declared_host(headers, uri).is_some_and(|host| is_local_origin(&host))
}
