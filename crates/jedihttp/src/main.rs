//! JediHTTP server binary.
//!
//! Prints `serving on http://<addr>` on stdout once the listener is bound,
//! which is what launching editors wait for before sending requests.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jedihttp::analysis::LexicalAnalyzer;
use jedihttp::domain::{AuthConfig, HttpConfig, LimitsConfig, ServerConfig};
use jedihttp::JediHttpService;

/// Local code-intelligence HTTP server
#[derive(Parser, Debug)]
#[command(name = "jedihttp", version)]
#[command(about = "Code completion and navigation over HTTP, HMAC authenticated")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to bind, 0 picks a free one
    #[arg(long, default_value_t = 0)]
    port: u16,

    /// JSON file holding the shared secret; read once, then deleted
    #[arg(long = "hmac-file-secret", value_name = "PATH")]
    hmac_file_secret: Option<PathBuf>,

    /// Log filter directive
    #[arg(long, env = "JEDIHTTP_LOG", default_value = "jedihttp=info,tower_http=warn")]
    log_filter: String,

    /// Largest accepted request body, in bytes
    #[arg(long, default_value_t = LimitsConfig::default().max_body_size)]
    max_body_size: usize,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            http: HttpConfig {
                host: self.host,
                port: self.port,
            },
            limits: LimitsConfig {
                max_body_size: self.max_body_size,
            },
            auth: AuthConfig {
                hmac_secret_file: self.hmac_file_secret,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_filter)
        .with_context(|| format!("invalid log filter {:?}", args.log_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = args.into_config();
    let service = JediHttpService::bind(&config, Arc::new(LexicalAnalyzer::new()))
        .await
        .context("failed to start JediHTTP")?;

    let addr = service.local_addr()?;
    println!("serving on http://{}", addr);
    info!(%addr, "serving on http://{}", addr);

    service.serve().await?;
    Ok(())
}
