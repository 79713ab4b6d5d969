//! Connection handle
//!
//! The coordinator's side of one client's outbound channel.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerEvent;
use crate::types::ClientId;

/// Outbound channel to a connected client
#[derive(Debug, Clone)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ClientId,
    /// Server → Client event channel
    sender: mpsc::Sender<ServerEvent>,
}

impl Connection {
    pub fn new(id: ClientId, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self { id, sender }
    }

    /// Queue an event for this client without waiting
    ///
    /// Returns an error if the channel is closed or its buffer is full.
    pub fn send(&self, event: ServerEvent) -> Result<(), SendError> {
        self.sender.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}
