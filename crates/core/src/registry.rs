//! Dynamic room registry - rooms JTC created and may delete
//!
//! Only rooms registered here are ever deleted, so a pre-existing room that
//! empties out (a trigger room included) is never touched.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::{DynamicRoom, MemberId, RoomId};

#[derive(Debug, Default)]
pub struct DynamicRoomRegistry {
    rooms: HashMap<RoomId, DynamicRoom>,
}

impl DynamicRoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly provisioned room, replacing any stale record
    pub fn register(&mut self, record: DynamicRoom) {
        if let Some(previous) = self.rooms.insert(record.room_id.clone(), record) {
            tracing::warn!(
                room_id = %previous.room_id,
                previous_owner = %previous.owner,
                "Replaced existing dynamic room record"
            );
        }
    }

    /// Remove a record once its room is gone
    pub fn unregister(&mut self, room: &RoomId) -> Result<DynamicRoom> {
        self.rooms
            .remove(room)
            .ok_or_else(|| Error::NotFound(format!("dynamic room {}", room)))
    }

    pub fn is_dynamic(&self, room: &RoomId) -> bool {
        self.rooms.contains_key(room)
    }

    pub fn get(&self, room: &RoomId) -> Option<&DynamicRoom> {
        self.rooms.get(room)
    }

    /// Rooms provisioned for a member
    pub fn owned_by<'a>(&'a self, owner: &'a MemberId) -> impl Iterator<Item = &'a DynamicRoom> {
        self.rooms.values().filter(move |r| &r.owner == owner)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DynamicRoom> {
        self.rooms.values()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
