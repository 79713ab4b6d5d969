//! Connection registry
//!
//! Maps each joined connection to its user session record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SessionError;
use crate::types::{ClientId, RoomName};

/// Longest accepted username, in characters
pub const MAX_USERNAME_LEN: usize = 20;

/// User session record for a joined connection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Connection this session belongs to
    pub id: ClientId,
    pub username: String,
    /// Room the connection is currently in
    pub room: RoomName,
    pub joined_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: ClientId, username: String, room: RoomName) -> Self {
        Self {
            id,
            username,
            room,
            joined_at: Utc::now(),
        }
    }
}

/// Trim and validate a requested username
///
/// Returns the trimmed name, or a reason it was refused.
pub fn validate_username(username: &str) -> Result<String, String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err("username must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_USERNAME_LEN {
        return Err(format!(
            "username must be at most {} characters",
            MAX_USERNAME_LEN
        ));
    }
    Ok(trimmed.to_string())
}

/// All user sessions keyed by connection
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    users: HashMap<ClientId, User>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for `id`
    ///
    /// Fails if the connection already has one.
    pub fn register(
        &mut self,
        id: ClientId,
        username: String,
        room: RoomName,
    ) -> Result<&User, SessionError> {
        if self.users.contains_key(&id) {
            return Err(SessionError::DuplicateConnection(id));
        }
        let user = self
            .users
            .entry(id)
            .or_insert_with(|| User::new(id, username, room));
        Ok(&*user)
    }

    pub fn lookup(&self, id: ClientId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Move the session to another room
    pub fn update_room(&mut self, id: ClientId, room: RoomName) -> Result<(), SessionError> {
        let user = self
            .users
            .get_mut(&id)
            .ok_or(SessionError::UnknownConnection(id))?;
        user.room = room;
        Ok(())
    }

    pub fn remove(&mut self, id: ClientId) -> Option<User> {
        self.users.remove(&id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
