//! Event fan-out to rooms and single connections
//!
//! Delivery is best effort: a closed or full outbound channel drops the event.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::connection::Connection;
use crate::error::SendError;
use crate::message::ServerEvent;
use crate::room::RoomRegistry;
use crate::types::{ClientId, RoomName};

/// Outbound channels of every live connection
#[derive(Debug, Default)]
pub struct Broadcaster {
    connections: HashMap<ClientId, Connection>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outbound channel, replacing any previous one
    pub fn attach(&mut self, connection: Connection) {
        self.connections.insert(connection.id, connection);
    }

    pub fn detach(&mut self, client_id: ClientId) -> Option<Connection> {
        self.connections.remove(&client_id)
    }

    pub fn is_attached(&self, client_id: ClientId) -> bool {
        self.connections.contains_key(&client_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Send to one connection
    pub fn to_connection(&self, client_id: ClientId, event: ServerEvent) {
        let Some(connection) = self.connections.get(&client_id) else {
            debug!("Dropping event for detached connection {}", client_id);
            return;
        };
        match connection.send(event) {
            Ok(()) => {}
            Err(SendError::ChannelClosed) => {
                debug!("Connection {} already closed", client_id);
            }
            Err(SendError::ChannelFull) => {
                warn!("Outbound buffer full for {}, event dropped", client_id);
            }
        }
    }

    /// Send to every member of `room`
    pub fn to_room(&self, rooms: &RoomRegistry, room: &RoomName, event: &ServerEvent) {
        for client_id in rooms.members(room) {
            self.to_connection(client_id, event.clone());
        }
    }

    /// Send to every member of `room` except `except`
    pub fn to_room_except(
        &self,
        rooms: &RoomRegistry,
        room: &RoomName,
        except: ClientId,
        event: &ServerEvent,
    ) {
        for client_id in rooms.members(room) {
            if client_id != except {
                self.to_connection(client_id, event.clone());
            }
        }
    }
}
