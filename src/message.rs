//! Message protocol definitions
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.
//! Both directions are closed enums so adding an event is a compile-checked change.

use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;
use crate::error::JoinError;
use crate::session::User;
use crate::types::{ClientId, RoomName};

/// Client → Server event
///
/// A missing `room` falls back to the default room. Connection close is not
/// an event here; the transport reports it separately.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Enter a room under a username
    Join {
        username: String,
        #[serde(default)]
        room: RoomName,
    },
    /// Post a message to a room
    SendMessage {
        message: String,
        #[serde(default)]
        room: RoomName,
    },
    /// Typing indicator on or off
    Typing {
        #[serde(default)]
        room: RoomName,
        is_typing: bool,
    },
    /// Leave the current room for another
    SwitchRoom { new_room: RoomName },
}

/// Server → Client event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Connection accepted, carries the connection's own id
    Connected { id: ClientId },
    /// Room history replayed to a (re)joining connection
    PreviousMessages(Vec<ChatMessage>),
    /// A new message in the room
    Message(ChatMessage),
    /// Users currently in the room
    UserList(Vec<User>),
    /// Another member started or stopped typing
    UserTyping { username: String, is_typing: bool },
    /// Request rejected
    Error { code: ErrorCode, message: String },
}

/// Error codes for ServerEvent::Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Username blank or too long
    InvalidUsername,
    /// Join sent by a connection that already joined
    AlreadyJoined,
}

/// Convert JoinError to ServerEvent for client notification
impl From<JoinError> for ServerEvent {
    fn from(err: JoinError) -> Self {
        let code = match &err {
            JoinError::InvalidUsername(_) => ErrorCode::InvalidUsername,
            JoinError::AlreadyJoined => ErrorCode::AlreadyJoined,
        };
        ServerEvent::Error {
            code,
            message: err.to_string(),
        }
    }
}
