//! Basic type definitions for the relay
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based connection identifier
//! - `MessageId`: UUID-based chat message identifier
//! - `RoomName`: trimmed, non-empty room name

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the room every client lands in when none is given
pub const DEFAULT_ROOM: &str = "general";

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe connection identification.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique chat message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Room name
///
/// Surrounding whitespace is stripped; the empty name is rejected, which
/// makes any inbound event carrying a blank room fail to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomName(String);

impl RoomName {
    /// Create a room name, returning None if it is blank
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_ROOM
    }
}

impl Default for RoomName {
    fn default() -> Self {
        Self(DEFAULT_ROOM.to_string())
    }
}

impl TryFrom<String> for RoomName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| "room name must not be blank".to_string())
    }
}

impl From<RoomName> for String {
    fn from(name: RoomName) -> Self {
        name.0
    }
}

impl std::fmt::Display for RoomName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
