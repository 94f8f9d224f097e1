//! Membership tracker - who is believed to be in which room
//!
//! Built purely from membership events. Both update operations are idempotent
//! for redundant signals, so a replayed leave or join never skews occupancy.

use std::collections::{HashMap, HashSet};

use crate::models::{MemberId, RoomId};

#[derive(Debug, Default)]
pub struct MembershipTracker {
    rooms: HashMap<RoomId, HashSet<MemberId>>,
}

impl MembershipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a member entering a room, returning the new occupancy
    pub fn on_join(&mut self, room: &RoomId, member: &MemberId) -> usize {
        let members = self.rooms.entry(room.clone()).or_default();
        members.insert(member.clone());
        members.len()
    }

    /// Record a member leaving a room, returning the new occupancy
    ///
    /// Empty rooms are dropped so "absent" and "empty" stay the same thing.
    pub fn on_leave(&mut self, room: &RoomId, member: &MemberId) -> usize {
        let Some(members) = self.rooms.get_mut(room) else {
            return 0;
        };
        members.remove(member);
        let remaining = members.len();
        if remaining == 0 {
            self.rooms.remove(room);
        }
        remaining
    }

    /// Occupancy the room would have after `member` leaves it
    pub fn occupancy_after_leave(&self, room: &RoomId, member: &MemberId) -> usize {
        match self.rooms.get(room) {
            Some(members) if members.contains(member) => members.len() - 1,
            Some(members) => members.len(),
            None => 0,
        }
    }

    pub fn occupancy(&self, room: &RoomId) -> usize {
        self.rooms.get(room).map_or(0, HashSet::len)
    }

    pub fn is_tracked(&self, room: &RoomId) -> bool {
        self.rooms.contains_key(room)
    }

    pub fn contains(&self, room: &RoomId, member: &MemberId) -> bool {
        self.rooms.get(room).is_some_and(|m| m.contains(member))
    }

    /// Room a member is currently recorded in
    pub fn room_of(&self, member: &MemberId) -> Option<&RoomId> {
        self.rooms
            .iter()
            .find(|(_, members)| members.contains(member))
            .map(|(room, _)| room)
    }

    /// Drop everything known about a room
    pub fn forget(&mut self, room: &RoomId) {
        self.rooms.remove(room);
    }

    /// Number of rooms with at least one tracked member
    pub fn tracked_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&RoomId, &HashSet<MemberId>)> {
        self.rooms.iter()
    }
}
