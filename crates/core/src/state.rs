//! Lifecycle state shared by the event processor
//!
//! Membership and ownership live side by side so one lock covers the whole
//! read-decide-write sequence of an event.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{GuildId, MemberId, RoomId};
use crate::registry::DynamicRoomRegistry;
use crate::tracker::MembershipTracker;

/// Lifecycle phase of a room as seen by JTC
///
/// `Deleted` is terminal and only ever reported in transitions; a deleted
/// room is indistinguishable from an untracked one afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomPhase {
    Untracked,
    /// Trigger room waiting for a member to enter
    TriggerWait,
    Occupied,
    /// Dynamic room with no members that still exists
    Empty,
    Deleted,
}

#[derive(Debug, Default)]
pub struct LifecycleState {
    pub membership: MembershipTracker,
    pub dynamic: DynamicRoomRegistry,
}

impl LifecycleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase of a room; `is_trigger` comes from the trigger registry
    pub fn phase(&self, room: &RoomId, is_trigger: bool) -> RoomPhase {
        if is_trigger {
            RoomPhase::TriggerWait
        } else if self.membership.occupancy(room) > 0 {
            RoomPhase::Occupied
        } else if self.dynamic.is_dynamic(room) {
            RoomPhase::Empty
        } else {
            RoomPhase::Untracked
        }
    }

    /// Read-only view for status queries
    pub fn snapshot(&self) -> LifecycleSnapshot {
        let mut dynamic_rooms: Vec<DynamicRoomStatus> = self
            .dynamic
            .iter()
            .map(|record| {
                let occupancy = self.membership.occupancy(&record.room_id);
                DynamicRoomStatus {
                    room_id: record.room_id.clone(),
                    guild_id: record.guild_id.clone(),
                    owner: record.owner.clone(),
                    name: record.name.clone(),
                    created_at: record.created_at,
                    occupancy,
                    phase: self.phase(&record.room_id, false),
                }
            })
            .collect();
        dynamic_rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        LifecycleSnapshot {
            tracked_rooms: self.membership.tracked_rooms(),
            dynamic_rooms,
        }
    }
}

/// Status of one dynamic room
#[derive(Debug, Clone, Serialize)]
pub struct DynamicRoomStatus {
    pub room_id: RoomId,
    pub guild_id: GuildId,
    pub owner: MemberId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub occupancy: usize,
    pub phase: RoomPhase,
}

/// Point-in-time copy of the lifecycle state
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleSnapshot {
    pub tracked_rooms: usize,
    pub dynamic_rooms: Vec<DynamicRoomStatus>,
}

impl LifecycleSnapshot {
    pub fn for_guild<'a>(&'a self, guild: &'a GuildId) -> impl Iterator<Item = &'a DynamicRoomStatus> {
        self.dynamic_rooms.iter().filter(move |r| &r.guild_id == guild)
    }

    /// JSON form, logged at shutdown so leftover rooms can be cleaned by hand
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
