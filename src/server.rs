//! ChatServer Actor implementation
//!
//! The central actor that owns all session state: user sessions, rooms and
//! their history, outbound channels and typing timers.
//! Commands are processed one at a time, so each event's registry updates and
//! broadcasts complete before the next event starts.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::broadcaster::Broadcaster;
use crate::chat::ChatMessage;
use crate::connection::Connection;
use crate::error::JoinError;
use crate::message::ServerEvent;
use crate::room::RoomRegistry;
use crate::session::{validate_username, ConnectionRegistry, User};
use crate::types::{ClientId, RoomName};
use crate::typing::{TypingExpiry, TypingKey, TypingTimers, TYPING_TIMEOUT};

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection opened
    Connect {
        client_id: ClientId,
        sender: mpsc::Sender<ServerEvent>,
    },
    /// Connection closed
    Disconnect {
        client_id: ClientId,
    },
    /// Enter a room under a username
    Join {
        client_id: ClientId,
        username: String,
        room: RoomName,
    },
    /// Post a message to a room
    SendMessage {
        client_id: ClientId,
        text: String,
        room: RoomName,
    },
    /// Typing indicator on or off
    Typing {
        client_id: ClientId,
        room: RoomName,
        is_typing: bool,
    },
    /// Move to another room
    SwitchRoom {
        client_id: ClientId,
        new_room: RoomName,
    },
    /// Read the names of all known rooms
    ListRooms {
        reply: oneshot::Sender<Vec<RoomName>>,
    },
}

/// The main ChatServer actor
pub struct ChatServer {
    /// User sessions: ClientId -> User
    sessions: ConnectionRegistry,
    /// Rooms with membership and history
    rooms: RoomRegistry,
    /// Outbound channels of live connections
    broadcaster: Broadcaster,
    /// Typing indicator expiries
    typing: TypingTimers,
    typing_timeout: Duration,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
    /// Fired typing timers
    expiry_rx: mpsc::UnboundedReceiver<TypingExpiry>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self::with_typing_timeout(receiver, TYPING_TIMEOUT)
    }

    pub fn with_typing_timeout(
        receiver: mpsc::Receiver<ServerCommand>,
        typing_timeout: Duration,
    ) -> Self {
        let (typing, expiry_rx) = TypingTimers::new();
        Self {
            sessions: ConnectionRegistry::new(),
            rooms: RoomRegistry::new(),
            broadcaster: Broadcaster::new(),
            typing,
            typing_timeout,
            receiver,
            expiry_rx,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(expiry) = self.expiry_rx.recv() => {
                    self.handle_typing_expired(expiry);
                }
            }
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect { client_id, sender } => {
                self.handle_connect(client_id, sender);
            }
            ServerCommand::Disconnect { client_id } => {
                self.handle_disconnect(client_id);
            }
            ServerCommand::Join {
                client_id,
                username,
                room,
            } => {
                self.handle_join(client_id, username, room);
            }
            ServerCommand::SendMessage {
                client_id,
                text,
                room,
            } => {
                self.handle_send_message(client_id, text, room);
            }
            ServerCommand::Typing {
                client_id,
                room,
                is_typing,
            } => {
                self.handle_typing(client_id, room, is_typing);
            }
            ServerCommand::SwitchRoom {
                client_id,
                new_room,
            } => {
                self.handle_switch_room(client_id, new_room);
            }
            ServerCommand::ListRooms { reply } => {
                let _ = reply.send(self.rooms.room_names());
            }
        }
    }

    /// Handle new connection
    fn handle_connect(&mut self, client_id: ClientId, sender: mpsc::Sender<ServerEvent>) {
        info!("Client {} connected", client_id);
        self.broadcaster.attach(Connection::new(client_id, sender));
        self.broadcaster
            .to_connection(client_id, ServerEvent::Connected { id: client_id });
        debug!(
            "Total connections: {}, Total users: {}",
            self.broadcaster.len(),
            self.sessions.len()
        );
    }

    /// Handle connection close
    fn handle_disconnect(&mut self, client_id: ClientId) {
        info!("Client {} disconnected", client_id);
        self.broadcaster.detach(client_id);

        if let Some(user) = self.sessions.remove(client_id) {
            self.clear_typing(&user.room, &user.username, client_id);
            self.rooms.remove_member(&user.room, client_id);
            self.broadcast_user_list(&user.room);
            self.publish(ChatMessage::left(user.room.clone(), &user.username));
            info!("User disconnected: {}", user.username);
        }

        debug!(
            "Total connections: {}, Total users: {}",
            self.broadcaster.len(),
            self.sessions.len()
        );
    }

    /// Handle room entry
    fn handle_join(&mut self, client_id: ClientId, username: String, room: RoomName) {
        if self.sessions.lookup(client_id).is_some() {
            warn!("Client {} sent join while already joined", client_id);
            self.broadcaster
                .to_connection(client_id, JoinError::AlreadyJoined.into());
            return;
        }

        let username = match validate_username(&username) {
            Ok(username) => username,
            Err(reason) => {
                warn!("Client {} join rejected: {}", client_id, reason);
                self.broadcaster
                    .to_connection(client_id, JoinError::InvalidUsername(reason).into());
                return;
            }
        };

        if let Err(e) = self
            .sessions
            .register(client_id, username.clone(), room.clone())
        {
            error!("Failed to register client {}: {}", client_id, e);
            return;
        }

        self.rooms.add_member(&room, client_id);

        // History as it was before this join
        let history = self.rooms.history(&room);
        self.broadcaster
            .to_connection(client_id, ServerEvent::PreviousMessages(history));

        self.publish(ChatMessage::joined(room.clone(), &username));
        self.broadcast_user_list(&room);

        info!("{} joined room: {}", username, room);
    }

    /// Handle chat message
    ///
    /// The message goes to the room named in the event, which need not be the
    /// sender's current room.
    fn handle_send_message(&mut self, client_id: ClientId, text: String, room: RoomName) {
        let Some(user) = self.sessions.lookup(client_id).cloned() else {
            debug!("Ignoring message from client {} with no session", client_id);
            return;
        };

        self.clear_typing(&room, &user.username, client_id);

        debug!("Message from {} in {}: {}", user.username, room, text);
        self.publish(ChatMessage::from_user(&user, room, text));
    }

    /// Handle typing indicator
    fn handle_typing(&mut self, client_id: ClientId, room: RoomName, is_typing: bool) {
        let Some(user) = self.sessions.lookup(client_id).cloned() else {
            return;
        };

        let key = TypingKey::new(room.clone(), user.username.clone());
        if is_typing {
            self.typing.schedule(key, client_id, self.typing_timeout);
        } else {
            self.typing.cancel(&key);
        }

        self.broadcaster.to_room_except(
            &self.rooms,
            &room,
            client_id,
            &ServerEvent::UserTyping {
                username: user.username,
                is_typing,
            },
        );
    }

    /// Handle a fired typing timer
    fn handle_typing_expired(&mut self, expiry: TypingExpiry) {
        let Some(owner) = self.typing.fire(&expiry) else {
            debug!("Ignoring stale typing expiry for {}", expiry.key.username);
            return;
        };

        debug!(
            "Typing indicator expired for {} in {}",
            expiry.key.username, expiry.key.room
        );
        self.broadcaster.to_room_except(
            &self.rooms,
            &expiry.key.room,
            owner,
            &ServerEvent::UserTyping {
                username: expiry.key.username.clone(),
                is_typing: false,
            },
        );
    }

    /// Handle room switch
    ///
    /// Old room teardown completes before the new room sees the user.
    fn handle_switch_room(&mut self, client_id: ClientId, new_room: RoomName) {
        let Some(user) = self.sessions.lookup(client_id).cloned() else {
            return;
        };
        let old_room = user.room;

        self.clear_typing(&old_room, &user.username, client_id);
        self.rooms.remove_member(&old_room, client_id);
        self.broadcast_user_list(&old_room);
        self.publish(ChatMessage::left(old_room.clone(), &user.username));

        if let Err(e) = self.sessions.update_room(client_id, new_room.clone()) {
            warn!("Room switch for client {} failed: {}", client_id, e);
            return;
        }
        self.rooms.add_member(&new_room, client_id);

        let history = self.rooms.history(&new_room);
        self.broadcaster
            .to_connection(client_id, ServerEvent::PreviousMessages(history));

        self.publish(ChatMessage::joined(new_room.clone(), &user.username));
        self.broadcast_user_list(&new_room);

        info!(
            "{} switched from {} to {}",
            user.username, old_room, new_room
        );
    }

    /// Helper: Store a message in its room's history and broadcast it there
    fn publish(&mut self, message: ChatMessage) {
        let room = message.room.clone();
        self.rooms.append_message(&room, message.clone());
        self.broadcaster
            .to_room(&self.rooms, &room, &ServerEvent::Message(message));
    }

    /// Helper: Send the room's current users to everyone in it
    fn broadcast_user_list(&self, room: &RoomName) {
        let mut users: Vec<User> = self
            .rooms
            .members(room)
            .into_iter()
            .filter_map(|id| self.sessions.lookup(id).cloned())
            .collect();
        users.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.id.cmp(&b.id)));

        self.broadcaster
            .to_room(&self.rooms, room, &ServerEvent::UserList(users));
    }

    /// Helper: Drop a typing indicator raised by `client_id` and tell the room
    fn clear_typing(&mut self, room: &RoomName, username: &str, client_id: ClientId) {
        let key = TypingKey::new(room.clone(), username);
        if self.typing.owner(&key) != Some(client_id) {
            return;
        }
        self.typing.cancel(&key);

        self.broadcaster.to_room_except(
            &self.rooms,
            room,
            client_id,
            &ServerEvent::UserTyping {
                username: username.to_string(),
                is_typing: false,
            },
        );
    }
}
