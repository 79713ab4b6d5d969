//! Error types for the relay
//!
//! Defines application-level errors, registry errors and outbound send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::ClientId;

/// Application-level errors
///
/// Fatal for the connection or task that hits them.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - coordinator is gone)
    #[error("Channel send error")]
    ChannelSend,
}

/// Join rejections
///
/// Reported back to the offending client as an `error` event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    /// Username is blank or too long
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Connection already has a user session
    #[error("Already joined")]
    AlreadyJoined,
}

/// Connection registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No user session exists for the connection
    #[error("Unknown connection: {0}")]
    UnknownConnection(ClientId),

    /// A user session already exists for the connection
    #[error("Duplicate connection: {0}")]
    DuplicateConnection(ClientId),
}

/// Outbound send errors
///
/// Sends never wait: a full buffer is reported instead of blocking the coordinator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The connection's outbound buffer is full
    #[error("Channel full")]
    ChannelFull,
}
