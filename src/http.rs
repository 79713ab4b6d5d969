//! Read-only HTTP endpoints
//!
//! `GET /api/health` and `GET /api/rooms`. Room names are read through the
//! ChatServer command channel like every other access to room state.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::error::AppError;
use crate::server::ServerCommand;
use crate::types::RoomName;

/// Query side of the ChatServer for HTTP handlers
#[derive(Debug, Clone)]
pub struct ServerHandle {
    cmd_tx: mpsc::Sender<ServerCommand>,
}

impl ServerHandle {
    pub fn new(cmd_tx: mpsc::Sender<ServerCommand>) -> Self {
        Self { cmd_tx }
    }

    /// Names of all rooms known to the server
    pub async fn room_names(&self) -> Result<Vec<RoomName>, AppError> {
        let (reply, response) = oneshot::channel();
        self.cmd_tx
            .send(ServerCommand::ListRooms { reply })
            .await
            .map_err(|_| AppError::ChannelSend)?;
        response.await.map_err(|_| AppError::ChannelSend)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RoomList {
    pub rooms: Vec<RoomName>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK",
        timestamp: Utc::now(),
    })
}

/// Get list of rooms
pub async fn list_rooms(State(handle): State<ServerHandle>) -> Result<Json<RoomList>, StatusCode> {
    match handle.room_names().await {
        Ok(rooms) => Ok(Json(RoomList { rooms })),
        Err(e) => {
            warn!("Room listing failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

pub fn router(handle: ServerHandle) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(list_rooms))
        .with_state(handle)
}

/// Serve the HTTP endpoints until the listener fails
pub async fn serve(listener: TcpListener, handle: ServerHandle) -> Result<(), AppError> {
    info!("HTTP endpoints listening on {}", listener.local_addr()?);
    axum::serve(listener, router(handle)).await?;
    Ok(())
}
