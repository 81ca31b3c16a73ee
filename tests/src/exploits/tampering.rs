//! # Signature Tampering
//!
//! An attacker who can observe or intercept traffic but does not hold the
//! secret tries to:
//!
//! - send requests without a signature, or with a malformed one
//! - replay a captured signature against another route or body
//! - sign with a guessed secret
//! - forge a response the client would accept

#[cfg(test)]
mod tests {
    use crate::support::{analysis_body, SignedClient, TestServer, SECRET};
    use jedihttp_hmac::{HmacHelper, HMAC_HEADER};
    use reqwest::header::{HeaderMap, HeaderValue};
    use reqwest::StatusCode;

    const ROUTES: &[&str] = &[
        "/healthy",
        "/ready",
        "/completions",
        "/gotodefinition",
        "/gotoassignment",
        "/usages",
    ];

    fn body() -> Vec<u8> {
        analysis_body("x = 1\nx", 2, 1, "/tmp/t.py")
    }

    #[tokio::test]
    async fn test_missing_signature_rejected_on_every_route() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        for route in ROUTES {
            let reply = client.send(client.host(), route, HeaderMap::new(), body()).await;
            assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{} served unsigned", route);
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_garbage_signatures_rejected() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        for value in ["", "not base64!", "AAAA", "dHJ1ZQ=="] {
            let mut headers = HeaderMap::new();
            headers.insert(HMAC_HEADER, HeaderValue::from_static(value));
            let reply = client.send(client.host(), "/ready", headers, Vec::new()).await;
            assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "accepted {:?}", value);
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_replay_on_other_route_rejected() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let captured = client.sign("/ready", &body());
        for route in ROUTES.iter().filter(|r| **r != "/ready") {
            let reply = client.send(client.host(), route, captured.clone(), body()).await;
            assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "replay accepted on {}", route);
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_replay_with_modified_body_rejected() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let original = body();
        let captured = client.sign("/completions", &original);

        let mut modified = original.clone();
        modified.push(b' ');
        let reply = client.send(client.host(), "/completions", captured.clone(), modified).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

        let reply = client
            .send(client.host(), "/completions", captured, analysis_body("y = 2\ny", 2, 1, "/tmp/t.py"))
            .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_exact_replay_accepted() {
        // No nonce: an identical replay is indistinguishable from the original.
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let captured = client.sign("/ready", b"");
        for _ in 0..2 {
            let reply = client.send(client.host(), "/ready", captured.clone(), Vec::new()).await;
            assert_eq!(reply.status, StatusCode::OK);
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let server = TestServer::start().await;

        for guess in ["", "secret", "mysecret ", "MYSECRET"] {
            let client = SignedClient::with_secret(&server, guess);
            let reply = client.post("/ready", Vec::new()).await;
            assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "secret {:?} accepted", guess);
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_forged_response_detected() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let mut reply = client.post("/ready", Vec::new()).await;
        assert!(reply.is_signed_with(SECRET));

        reply.body = b"false".to_vec();
        assert!(!reply.is_signed_with(SECRET));

        let mut forged = HeaderMap::new();
        HmacHelper::new("attacker").sign_response_headers(&mut forged, b"false");
        reply.headers = forged;
        assert!(!reply.is_signed_with(SECRET));

        server.stop().await;
    }

    mod properties {
        use jedihttp_hmac::HmacHelper;
        use proptest::prelude::*;
        use reqwest::header::HeaderMap;

        proptest! {
            #[test]
            fn tampered_request_never_verifies(
                body in proptest::collection::vec(any::<u8>(), 1..512),
                idx in any::<prop::sample::Index>(),
                flip in 1u8..=255,
            ) {
                let hmac = HmacHelper::new(super::SECRET);
                let mut headers = HeaderMap::new();
                hmac.sign_request_headers(&mut headers, "POST", "/completions", &body);

                let mut tampered = body.clone();
                let i = idx.index(tampered.len());
                tampered[i] ^= flip;
                let accepted = hmac.is_request_authenticated(&headers, "POST", "/completions", &tampered);
                prop_assert!(!accepted, "tampered byte {} still verifies", i);
            }

            #[test]
            fn other_route_never_verifies(route in "/[a-z]{1,16}") {
                prop_assume!(route != "/usages");
                let hmac = HmacHelper::new(super::SECRET);
                let mut headers = HeaderMap::new();
                hmac.sign_request_headers(&mut headers, "POST", "/usages", b"{}");
                let accepted = hmac.is_request_authenticated(&headers, "POST", &route, b"{}");
                prop_assert!(!accepted, "signature for /usages accepted on {}", route);
            }
        }
    }
}
