//! Chat message definitions
//!
//! Messages stored in room history and broadcast to room members.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::session::User;
use crate::types::{ClientId, MessageId, RoomName};

/// Message kind and kind-specific fields
///
/// Serialized into the flat wire shape clients expect:
/// `{"type": "system", "message": ...}` or
/// `{"type": "user", "message": ..., "username": ..., "userId": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    /// Server generated notice (joins and leaves)
    System {
        #[serde(rename = "message")]
        text: String,
    },
    /// Text sent by a user
    User {
        #[serde(rename = "message")]
        text: String,
        username: String,
        #[serde(rename = "userId")]
        author_id: ClientId,
    },
}

/// A single chat message, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    #[serde(flatten)]
    pub body: MessageBody,
    pub timestamp: DateTime<Utc>,
    pub room: RoomName,
}

impl ChatMessage {
    /// Create a system notice for the given room
    pub fn system(room: RoomName, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            body: MessageBody::System { text: text.into() },
            timestamp: Utc::now(),
            room,
        }
    }

    /// Create a message authored by `user`, addressed to `room`
    ///
    /// The target room is taken as given and may differ from `user.room`.
    pub fn from_user(user: &User, room: RoomName, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            body: MessageBody::User {
                text: text.into(),
                username: user.username.clone(),
                author_id: user.id,
            },
            timestamp: Utc::now(),
            room,
        }
    }

    pub fn joined(room: RoomName, username: &str) -> Self {
        Self::system(room, format!("{} joined the chat", username))
    }

    pub fn left(room: RoomName, username: &str) -> Self {
        Self::system(room, format!("{} left the chat", username))
    }

    pub fn text(&self) -> &str {
        match &self.body {
            MessageBody::System { text } | MessageBody::User { text, .. } => text,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self.body, MessageBody::System { .. })
    }
}
