//! Lifecycle orchestrator - pure decision logic
//!
//! Turns one membership event plus the current lifecycle state into an ordered
//! list of decisions. Nothing here performs IO; the event processor applies
//! the decisions against the platform and commits state changes.
//!
//! Ordering rule: leave-side decisions always come before join-side ones, so
//! a member walking out of their own dynamic room into a trigger room gets
//! the old room reclaimed before a new one is provisioned.

use crate::models::{render_room_name, GuildId, MemberId, MembershipEvent, RoomId};
use crate::state::LifecycleState;

/// Default name template for provisioned rooms
pub const DEFAULT_ROOM_NAME_TEMPLATE: &str = "{name}'s Channel";

/// Plain occupancy change with no platform side effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipUpdate {
    Leave(RoomId),
    Join(RoomId),
}

/// What to do in response to (one side of) an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Non-movement signal (mute, deafen, ...)
    Noop,
    /// Track occupancy only
    UpdateOnly(MembershipUpdate),
    /// The member leaves a dynamic room that becomes empty: record the leave,
    /// delete the room, then unregister it
    Delete { room: RoomId, member: MemberId },
    /// The member entered a trigger room: provision a room and move them in
    CreateAndMove {
        trigger: RoomId,
        guild: GuildId,
        owner: MemberId,
        room_name: String,
    },
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    room_name_template: String,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_ROOM_NAME_TEMPLATE)
    }
}

impl Orchestrator {
    pub fn new(room_name_template: impl Into<String>) -> Self {
        Self {
            room_name_template: room_name_template.into(),
        }
    }

    /// Decide how to handle an event
    ///
    /// `current_is_trigger` tells whether `event.current_room` is a trigger
    /// room; it is looked up by the caller since the trigger registry is
    /// durable storage.
    pub fn decide(
        &self,
        event: &MembershipEvent,
        state: &LifecycleState,
        current_is_trigger: bool,
    ) -> Vec<Decision> {
        if event.is_stationary() {
            return vec![Decision::Noop];
        }

        let mut decisions = Vec::with_capacity(2);

        if let Some(previous) = &event.previous_room {
            decisions.push(self.decide_leave(previous, &event.member, state));
        }

        if let Some(current) = &event.current_room {
            decisions.push(self.decide_join(current, event, current_is_trigger));
        }

        decisions
    }

    fn decide_leave(&self, room: &RoomId, member: &MemberId, state: &LifecycleState) -> Decision {
        let remaining = state.membership.occupancy_after_leave(room, member);
        if remaining == 0 && state.dynamic.is_dynamic(room) {
            Decision::Delete {
                room: room.clone(),
                member: member.clone(),
            }
        } else {
            Decision::UpdateOnly(MembershipUpdate::Leave(room.clone()))
        }
    }

    fn decide_join(&self, room: &RoomId, event: &MembershipEvent, is_trigger: bool) -> Decision {
        if is_trigger {
            Decision::CreateAndMove {
                trigger: room.clone(),
                guild: event.guild.clone(),
                owner: event.member.clone(),
                room_name: render_room_name(&self.room_name_template, &event.member_name),
            }
        } else {
            Decision::UpdateOnly(MembershipUpdate::Join(room.clone()))
        }
    }
}
