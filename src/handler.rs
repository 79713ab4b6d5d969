//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake,
//! event parsing, and bidirectional communication with the ChatServer.

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::message::{ClientEvent, ServerEvent};
use crate::server::ServerCommand;
use crate::types::ClientId;

/// Outbound buffer per connection
const OUTBOUND_BUFFER_SIZE: usize = 64;

/// Accept connections forever, spawning a handler task for each
pub async fn accept_connections(listener: TcpListener, cmd_tx: mpsc::Sender<ServerCommand>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a new TCP connection
///
/// Performs WebSocket handshake, sets up bidirectional communication,
/// and manages the connection lifecycle.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let client_id = ClientId::new();
    info!("Client {} connected from {}", client_id, peer_addr);

    // Channel for server -> client events
    let (event_tx, mut event_rx) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER_SIZE);

    // Register with ChatServer
    if cmd_tx
        .send(ServerCommand::Connect {
            client_id,
            sender: event_tx,
        })
        .await
        .is_err()
    {
        error!("Failed to register client {} - server closed", client_id);
        return Err(AppError::ChannelSend);
    }

    let cmd_tx_read = cmd_tx.clone();

    // Read task (WebSocket -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        let cmd = client_event_to_command(client_id, event);
                        if cmd_tx_read.send(cmd).await.is_err() {
                            debug!("Server closed, ending read task for {}", client_id);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Ignoring malformed event from {}: {}", client_id, e);
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Client {} sent close frame", client_id);
                    break;
                }
                Ok(_) => {
                    // Binary, ping and pong frames carry no events
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", client_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", client_id);
    });

    // Write task (ServerEvent -> WebSocket)
    let mut write_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize event: {}", e);
                }
            }
        }

        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete. The write task outlives the read task
    // until the server drops this connection's sender.
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", client_id);
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", client_id);
            read_task.abort();
        }
    }

    let _ = cmd_tx.send(ServerCommand::Disconnect { client_id }).await;

    info!("Client {} disconnected", client_id);

    Ok(())
}

/// Convert a ClientEvent to a ServerCommand
fn client_event_to_command(client_id: ClientId, event: ClientEvent) -> ServerCommand {
    match event {
        ClientEvent::Join { username, room } => ServerCommand::Join {
            client_id,
            username,
            room,
        },
        ClientEvent::SendMessage { message, room } => ServerCommand::SendMessage {
            client_id,
            text: message,
            room,
        },
        ClientEvent::Typing { room, is_typing } => ServerCommand::Typing {
            client_id,
            room,
            is_typing,
        },
        ClientEvent::SwitchRoom { new_room } => ServerCommand::SwitchRoom {
            client_id,
            new_room,
        },
    }
}
