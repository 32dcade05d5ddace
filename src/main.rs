use std::sync::Arc;

use mcp_coingecko_server::config::{ServerConfig, Transport};
use mcp_coingecko_server::server::McpServer;
use mcp_coingecko_server::upstream::CoinGeckoClient;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let client = match CoinGeckoClient::new(config.api_base.clone()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("cannot create upstream client: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(api_base = client.base_url(), "upstream configured");

    let server = McpServer::new(Arc::new(client));
    let outcome = match config.transport {
        Transport::Stdio => server.run_stdio().await,
        Transport::Tcp { port } => server.run_tcp(Transport::listen_addr(port)).await,
    };

    if let Err(e) = outcome {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}
