//! HTTP/2 server with ALPN-based fallback to HTTP/1.x.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──TCP──▶ net::listener ──▶ TLS handshake (ALPN: h2, http/1.1, http/1.0)
//!                                            │
//!                                            ▼
//!                                 negotiation::decide("h2"?)
//!                                   │                  │
//!                             Multiplexed            Legacy
//!                                   ▼                  ▼
//!                           hyper http2 engine   hyper http1 engine
//!                                   └───────┬──────────┘
//!                                           ▼
//!                                  axum Router + ServerEvent::Request
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{routing::get, Extension, Json, Router};
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tower_http::trace::TraceLayer;

use h2_alpn_server::config::{load_config, server_options};
use h2_alpn_server::lifecycle::shutdown_signal;
use h2_alpn_server::observability::init_logging;
use h2_alpn_server::{ConnectionInfo, Server, ServerEvent};

#[derive(Parser)]
#[command(name = "h2-alpn-server")]
#[command(about = "HTTP/2 server negotiating the protocol per connection", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "h2-alpn-server.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    init_logging(&config.observability.log_level);
    tracing::info!("h2-alpn-server v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        tls = config.tls.is_some(),
        "Configuration loaded"
    );

    let server = Server::new(server_options(&config)?, app())?;
    let mut events = server.subscribe();

    let addr: SocketAddr = config.listener.bind_address.parse()?;
    let local_addr = server.listen(addr).await?;
    tracing::info!(address = %local_addr, mode = %server.mode(), "Listening for connections");

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ServerEvent::Request(request)) => tracing::info!(
                    connection_id = %request.connection_id,
                    protocol = %request.outcome,
                    method = %request.method,
                    uri = %request.uri,
                    "Request"
                ),
                Ok(ServerEvent::Error(error)) => tracing::warn!(error = %error, "Connection failed"),
                Ok(ServerEvent::Close) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "Event subscriber lagged"),
            }
        }
    });

    shutdown_signal().await;
    server.close();
    server.closed().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn app() -> Router {
    Router::new()
        .route("/", get(protocol_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
}

/// Report which engine served the request.
async fn protocol_handler(Extension(info): Extension<ConnectionInfo>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "connection": info.connection_id.to_string(),
        "peer": info.peer_addr.to_string(),
        "protocol": info.outcome.as_str(),
    }))
}
