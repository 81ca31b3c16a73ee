//! Shared fixtures: a real server on an ephemeral port and a signing client.

use jedihttp::{AnalysisRequest, JediHttpService, LexicalAnalyzer, ServerConfig, ServerHandle};
use jedihttp_hmac::{write_secret_file, HmacHelper};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, HOST};
use reqwest::StatusCode;
use std::path::PathBuf;
use std::sync::Arc;

/// Secret shared by [`TestServer::start`] and [`SignedClient`]
pub const SECRET: &str = "mysecret";

/// JediHTTP running in the background on `127.0.0.1:<ephemeral>`
pub struct TestServer {
    handle: ServerHandle,
}

impl TestServer {
    /// Start a server that requires [`SECRET`], handed over through a secret file.
    pub async fn start() -> Self {
        let path = write_secret_file(SECRET).expect("write secret file");
        let mut config = ServerConfig::default();
        config.auth.hmac_secret_file = Some(path);
        Self::with_config(config).await
    }

    /// Start a server without authentication.
    pub async fn start_open() -> Self {
        Self::with_config(ServerConfig::default()).await
    }

    pub async fn with_config(config: ServerConfig) -> Self {
        let service = JediHttpService::bind(&config, Arc::new(LexicalAnalyzer))
            .await
            .expect("bind test server");
        Self {
            handle: service.spawn().expect("spawn test server"),
        }
    }

    pub fn base_url(&self) -> String {
        self.handle.url()
    }

    /// `Host` value a well-behaved local client sends
    pub fn host(&self) -> String {
        self.handle.addr().to_string()
    }

    pub async fn stop(self) {
        self.handle.shutdown().await.expect("clean shutdown");
    }
}

/// Buffered response
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("JSON response body")
    }

    /// Whether the response HMAC verifies under `secret`
    pub fn is_signed_with(&self, secret: &str) -> bool {
        HmacHelper::new(secret).is_response_authenticated(&self.headers, &self.body)
    }
}

/// HTTP client signing every request the way an editor plugin does
pub struct SignedClient {
    http: reqwest::Client,
    hmac: HmacHelper,
    base_url: String,
    host: String,
}

impl SignedClient {
    pub fn new(server: &TestServer) -> Self {
        Self::with_secret(server, SECRET)
    }

    pub fn with_secret(server: &TestServer, secret: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            hmac: HmacHelper::new(secret),
            base_url: server.base_url(),
            host: server.host(),
        }
    }

    /// Signed POST with the server's own address as `Host`
    pub async fn post(&self, path: &str, body: Vec<u8>) -> Reply {
        let host = self.host.clone();
        self.post_as(&host, path, body).await
    }

    /// Signed POST declaring an arbitrary `Host`
    pub async fn post_as(&self, host: &str, path: &str, body: Vec<u8>) -> Reply {
        let mut headers = HeaderMap::new();
        self.hmac.sign_request_headers(&mut headers, "POST", path, &body);
        self.send(host, path, headers, body).await
    }

    /// POST exactly the given headers and body, no signing
    pub async fn send(&self, host: &str, path: &str, mut headers: HeaderMap, body: Vec<u8>) -> Reply {
        headers.insert(HOST, HeaderValue::from_str(host).expect("valid Host"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .headers(headers)
            .body(body)
            .send()
            .await
            .expect("request sent");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.expect("response body").to_vec();
        Reply {
            status,
            headers,
            body,
        }
    }

    /// Sign a request without sending it
    pub fn sign(&self, path: &str, body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        self.hmac.sign_request_headers(&mut headers, "POST", path, body);
        headers
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Path of a fixture under `crates/jedihttp/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../crates/jedihttp/fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture exists")
}

/// JSON body for the analysis routes
pub fn analysis_body(source: &str, line: usize, col: usize, source_path: &str) -> Vec<u8> {
    serde_json::to_vec(&AnalysisRequest {
        source: source.to_string(),
        line,
        col,
        source_path: source_path.to_string(),
    })
    .expect("serializable request")
}

/// Analysis body for a fixture, with the fixture's real path as `source_path`
pub fn fixture_body(name: &str, line: usize, col: usize) -> Vec<u8> {
    let path = fixture_path(name);
    analysis_body(&fixture(name), line, col, &path.to_string_lossy())
}
