//! JediHTTP service - binds the listener and serves the router.

use crate::analysis::Analyzer;
use crate::domain::config::ServerConfig;
use crate::domain::error::ServiceError;
use crate::router::build_router;
use axum::Router;
use jedihttp_hmac::{read_secret_file, HmacHelper};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// A bound, not yet serving, JediHTTP server
pub struct JediHttpService {
    listener: TcpListener,
    router: Router,
    authenticated: bool,
}

impl JediHttpService {
    /// Validate `config`, consume the secret file if one is configured and
    /// bind the listener.
    pub async fn bind(
        config: &ServerConfig,
        analyzer: Arc<dyn Analyzer>,
    ) -> Result<Self, ServiceError> {
        config.validate()?;

        let hmac = match &config.auth.hmac_secret_file {
            Some(path) => {
                let secret = read_secret_file(path)?;
                info!(path = %path.display(), "HMAC secret loaded, secret file removed");
                Some(Arc::new(HmacHelper::new(secret)))
            }
            None => {
                warn!("no HMAC secret configured, requests will not be authenticated");
                None
            }
        };
        let authenticated = hmac.is_some();
        let router = build_router(analyzer, hmac, &config.limits);

        let listener = TcpListener::bind(config.http_addr())
            .await
            .map_err(ServiceError::Bind)?;

        Ok(Self {
            listener,
            router,
            authenticated,
        })
    }

    /// Address actually bound, useful with port 0
    pub fn local_addr(&self) -> Result<SocketAddr, ServiceError> {
        self.listener.local_addr().map_err(ServiceError::Bind)
    }

    /// Whether requests must be signed
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Serve until Ctrl+C.
    pub async fn serve(self) -> Result<(), ServiceError> {
        self.serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
            info!("received shutdown signal");
        })
        .await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        info!(%addr, authenticated = self.authenticated, "JediHTTP serving");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
            .map_err(ServiceError::Serve)?;

        info!("JediHTTP stopped");
        Ok(())
    }

    /// Serve in a background task. The returned handle stops the server.
    pub fn spawn(self) -> Result<ServerHandle, ServiceError> {
        let addr = self.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(self.serve_with_shutdown(async {
            let _ = shutdown_rx.await;
        }));

        Ok(ServerHandle {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }
}

/// Handle to a server running in the background
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<Result<(), ServiceError>>,
}

impl ServerHandle {
    /// Address the server is listening on
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL, e.g. `http://127.0.0.1:54321`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Trigger graceful shutdown and wait for the server to stop
    pub async fn shutdown(mut self) -> Result<(), ServiceError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(ServiceError::Serve(std::io::Error::other(e))),
        }
    }
}
