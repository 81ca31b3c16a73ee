//! # End-to-End Flows
//!
//! Launcher hands the secret over through a file, server consumes it, client
//! signs requests and verifies every response.

#[cfg(test)]
mod tests {
    use crate::support::{analysis_body, fixture_body, fixture_path, Reply, SignedClient, TestServer, SECRET};
    use jedihttp::{JediHttpService, LexicalAnalyzer, ServerConfig, ServiceError};
    use jedihttp_hmac::{write_secret_file, ProvisioningError};
    use reqwest::StatusCode;
    use std::sync::Arc;

    fn assert_signed_ok(reply: &Reply) {
        assert_eq!(reply.status, StatusCode::OK, "body: {}", String::from_utf8_lossy(&reply.body));
        assert!(reply.is_signed_with(SECRET), "response HMAC does not verify");
    }

    // =============================================================================
    // HEALTH
    // =============================================================================

    #[tokio::test]
    async fn test_healthy_and_ready() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        for path in ["/healthy", "/ready"] {
            let reply = client.post(path, Vec::new()).await;
            assert_signed_ok(&reply);
            assert_eq!(reply.body, b"true");
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_localhost_name_accepted() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let reply = client.post_as("localhost", "/ready", Vec::new()).await;
        assert_signed_ok(&reply);

        server.stop().await;
    }

    // =============================================================================
    // ANALYSIS ROUTES
    // =============================================================================

    #[tokio::test]
    async fn test_completions_fixture() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let reply = client.post("/completions", fixture_body("basic.py", 7, 2)).await;
        assert_signed_ok(&reply);
        assert_eq!(
            reply.headers.get("content-type").unwrap(),
            "application/json"
        );

        let body = reply.json();
        let names: Vec<&str> = body["completions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"a"));
        assert!(names.contains(&"b"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_completions_python3_dict() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let reply = client.post("/completions", fixture_body("py3.py", 19, 11)).await;
        assert_signed_ok(&reply);

        let body = reply.json();
        let names: Vec<&str> = body["completions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"values"));
        assert!(!names.contains(&"itervalues"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_goto_definition() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let reply = client.post("/gotodefinition", fixture_body("goto.py", 10, 3)).await;
        assert_signed_ok(&reply);

        let body = reply.json();
        let definitions = body["definitions"].as_array().unwrap();
        assert_eq!(definitions.len(), 2);

        let f = definitions.iter().find(|d| d["description"] == "def f").unwrap();
        assert_eq!(f["line"], 1);
        assert_eq!(f["column"], 4);
        assert_eq!(f["in_builtin_module"], false);
        assert_eq!(f["is_keyword"], false);
        assert_eq!(
            f["module_path"].as_str().unwrap(),
            fixture_path("goto.py").to_string_lossy()
        );
        assert_eq!(
            f["docstring"],
            "f()\n\nModule method docs\nAre dedented, like you might expect"
        );

        let c = definitions.iter().find(|d| d["description"] == "class C").unwrap();
        assert_eq!(c["line"], 6);
        assert_eq!(c["column"], 6);
        assert_eq!(c["docstring"], "Class Documentation");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_goto_definition_blank_position() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let reply = client.post("/gotodefinition", fixture_body("goto.py", 9, 0)).await;
        assert_signed_ok(&reply);
        assert_eq!(reply.json(), serde_json::json!({ "definitions": [] }));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_goto_assignment() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let reply = client.post("/gotoassignment", fixture_body("goto.py", 20, 1)).await;
        assert_signed_ok(&reply);

        let body = reply.json();
        let definitions = body["definitions"].as_array().unwrap();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0]["line"], 18);
        assert_eq!(definitions[0]["column"], 0);
        assert_eq!(definitions[0]["description"], "inception = _list[ 2 ]");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_usages() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let reply = client.post("/usages", fixture_body("usages.py", 8, 5)).await;
        assert_signed_ok(&reply);

        let body = reply.json();
        let lines: Vec<u64> = body["definitions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["line"].as_u64().unwrap())
            .collect();
        assert_eq!(lines, vec![1, 6, 7, 8]);

        server.stop().await;
    }

    // =============================================================================
    // ERRORS
    // =============================================================================

    #[tokio::test]
    async fn test_line_out_of_range_is_signed_500() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let reply = client.post("/gotodefinition", fixture_body("goto.py", 100, 1)).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(reply.is_signed_with(SECRET));

        let body = reply.json();
        assert_eq!(body["exception"], "LineOutOfRange");
        assert!(body["message"].as_str().unwrap().contains("100"));
        assert!(body["traceback"].is_string());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_malformed_body_is_signed_500() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let reply = client.post("/completions", b"{\"source\": ".to_vec()).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(reply.is_signed_with(SECRET));
        assert_eq!(reply.json()["exception"], "InvalidRequest");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_server_survives_errors() {
        let server = TestServer::start().await;
        let client = SignedClient::new(&server);

        let bad = client.post("/usages", analysis_body("", 5, 0, "/tmp/x.py")).await;
        assert_eq!(bad.status, StatusCode::INTERNAL_SERVER_ERROR);

        let good = client.post("/ready", Vec::new()).await;
        assert_signed_ok(&good);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_concurrent_requests() {
        let server = TestServer::start().await;
        let client = Arc::new(SignedClient::new(&server));

        let mut tasks = Vec::new();
        for i in 0..16 {
            let client = Arc::clone(&client);
            tasks.push(tokio::spawn(async move {
                let source = format!("value_{} = {}\nvalue_", i, i);
                client
                    .post("/completions", analysis_body(&source, 2, 6, "/tmp/c.py"))
                    .await
            }));
        }

        for (i, task) in tasks.into_iter().enumerate() {
            let reply = task.await.unwrap();
            assert_signed_ok(&reply);
            assert_eq!(reply.json()["completions"][0]["name"], format!("value_{}", i));
        }

        server.stop().await;
    }

    // =============================================================================
    // SECRET HANDOFF
    // =============================================================================

    #[tokio::test]
    async fn test_secret_file_removed_after_startup() {
        let path = write_secret_file(SECRET).unwrap();
        let mut config = ServerConfig::default();
        config.auth.hmac_secret_file = Some(path.clone());

        let service = JediHttpService::bind(&config, Arc::new(LexicalAnalyzer))
            .await
            .unwrap();
        assert!(!path.exists());
        assert!(service.is_authenticated());
    }

    #[tokio::test]
    async fn test_malformed_secret_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        std::fs::write(&path, r#"{"secret": "wrong field"}"#).unwrap();

        let mut config = ServerConfig::default();
        config.auth.hmac_secret_file = Some(path.clone());

        let err = JediHttpService::bind(&config, Arc::new(LexicalAnalyzer))
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ServiceError::Provisioning(ProvisioningError::MissingSecret(_))
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_open_server_serves_unsigned() {
        let server = TestServer::start_open().await;
        let client = SignedClient::new(&server);

        let reply = client
            .send(client.host(), "/ready", Default::default(), Vec::new())
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.headers.get(jedihttp_hmac::HMAC_HEADER).is_none());

        server.stop().await;
    }
}
