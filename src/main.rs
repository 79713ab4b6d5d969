//! Multi-room WebSocket Chat Relay - Entry Point
//!
//! Starts the ChatServer actor, the HTTP endpoints and the WebSocket
//! listener, and runs until Ctrl+C.

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use room_relay::{accept_connections, http, ChatServer, Config, ServerHandle};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=room_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("room_relay=info")),
        )
        .init();

    let config = Config::parse();

    let listener = TcpListener::bind(&config.ws_addr).await?;
    info!("WebSocket Chat Relay listening on {}", config.ws_addr);

    let http_listener = TcpListener::bind(&config.http_addr).await?;

    // Create ChatServer actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
    let server = ChatServer::with_typing_timeout(cmd_rx, config.typing_timeout());
    tokio::spawn(server.run());

    let handle = ServerHandle::new(cmd_tx.clone());
    tokio::spawn(async move {
        if let Err(e) = http::serve(http_listener, handle).await {
            error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = accept_connections(listener, cmd_tx) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
