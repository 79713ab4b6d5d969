//! Room registry
//!
//! Rooms are named groups with a member set and a bounded message history.
//! They are created on first use and never removed.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::chat::ChatMessage;
use crate::types::{ClientId, RoomName};

/// Maximum number of messages retained per room
pub const HISTORY_LIMIT: usize = 100;

/// Chat room
#[derive(Debug)]
pub struct Room {
    /// Room name
    pub name: RoomName,
    /// Connections currently in the room
    members: HashSet<ClientId>,
    /// Most recent messages, oldest first
    history: VecDeque<ChatMessage>,
}

impl Room {
    /// Create an empty room
    pub fn new(name: RoomName) -> Self {
        Self {
            name,
            members: HashSet::new(),
            history: VecDeque::new(),
        }
    }

    /// Add a member. Returns false if already present.
    pub fn add_member(&mut self, client_id: ClientId) -> bool {
        self.members.insert(client_id)
    }

    /// Remove a member. Returns false if it was not present.
    pub fn remove_member(&mut self, client_id: ClientId) -> bool {
        self.members.remove(&client_id)
    }

    pub fn members(&self) -> &HashSet<ClientId> {
        &self.members
    }

    /// Append a message, evicting the oldest beyond `HISTORY_LIMIT`
    pub fn push_message(&mut self, message: ChatMessage) {
        self.history.push_back(message);
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.history.iter()
    }
}

/// All rooms keyed by name
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomName, Room>,
}

impl RoomRegistry {
    /// Create a registry holding only the default room
    pub fn new() -> Self {
        let mut registry = Self {
            rooms: HashMap::new(),
        };
        registry.ensure(&RoomName::default());
        registry
    }

    /// Get the room, creating it empty if it does not exist
    pub fn ensure(&mut self, name: &RoomName) -> &mut Room {
        self.rooms
            .entry(name.clone())
            .or_insert_with(|| Room::new(name.clone()))
    }

    pub fn get(&self, name: &RoomName) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn add_member(&mut self, name: &RoomName, client_id: ClientId) {
        self.ensure(name).add_member(client_id);
    }

    pub fn remove_member(&mut self, name: &RoomName, client_id: ClientId) {
        if let Some(room) = self.rooms.get_mut(name) {
            room.remove_member(client_id);
        }
    }

    /// Members of the room, empty if the room does not exist
    pub fn members(&self, name: &RoomName) -> Vec<ClientId> {
        self.rooms
            .get(name)
            .map(|room| room.members().iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn append_message(&mut self, name: &RoomName, message: ChatMessage) {
        self.ensure(name).push_message(message);
    }

    /// History of the room in insertion order, empty if the room does not exist
    pub fn history(&self, name: &RoomName) -> Vec<ChatMessage> {
        self.rooms
            .get(name)
            .map(|room| room.history().cloned().collect())
            .unwrap_or_default()
    }

    /// All room names, sorted
    pub fn room_names(&self) -> Vec<RoomName> {
        let mut names: Vec<RoomName> = self.rooms.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
