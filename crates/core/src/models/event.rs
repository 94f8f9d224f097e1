//! Membership change events delivered by the platform

use serde::{Deserialize, Serialize};

use super::{GuildId, MemberId, RoomId};
use crate::error::{Error, Result};

/// Snapshot of one member's room transition
///
/// `previous_room` is `None` when the member was not in any room before,
/// `current_room` is `None` when the member left all rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipEvent {
    pub member: MemberId,
    /// Display identity used to name provisioned rooms
    #[serde(default)]
    pub member_name: String,
    pub guild: GuildId,
    #[serde(default)]
    pub previous_room: Option<RoomId>,
    #[serde(default)]
    pub current_room: Option<RoomId>,
}

impl MembershipEvent {
    pub fn new(
        guild: GuildId,
        member: MemberId,
        previous_room: Option<RoomId>,
        current_room: Option<RoomId>,
    ) -> Self {
        let member_name = member.0.clone();
        Self {
            member,
            member_name,
            guild,
            previous_room,
            current_room,
        }
    }

    pub fn with_member_name(mut self, name: impl Into<String>) -> Self {
        self.member_name = name.into();
        self
    }

    /// True for mute/deafen and other signals that don't move the member
    pub fn is_stationary(&self) -> bool {
        self.previous_room == self.current_room
    }

    /// Reject malformed notifications before they touch tracked state
    pub fn validate(&self) -> Result<()> {
        if self.member.is_blank() {
            return Err(Error::InvalidEvent("missing member id".into()));
        }
        if self.guild.is_blank() {
            return Err(Error::InvalidEvent(format!(
                "missing guild id for member {}",
                self.member
            )));
        }
        let blank_room = |room: &Option<RoomId>| room.as_ref().is_some_and(|r| r.is_blank());
        if blank_room(&self.previous_room) || blank_room(&self.current_room) {
            return Err(Error::InvalidEvent(format!(
                "blank room id in event for member {}",
                self.member
            )));
        }
        Ok(())
    }
}
