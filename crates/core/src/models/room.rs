//! Room models - platform rooms, trigger rooms and rooms owned by JTC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GuildId, MemberId, RoomId};

/// Kind of a platform room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Voice,
    Text,
    /// Container that parents other rooms
    Category,
    #[serde(other)]
    Other,
}

impl RoomKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            RoomKind::Voice => "voice",
            RoomKind::Text => "text",
            RoomKind::Category => "category",
            RoomKind::Other => "other",
        }
    }
}

/// A room as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub guild_id: GuildId,
    pub name: String,
    pub kind: RoomKind,
    /// Parent container, if the room is nested under one
    #[serde(default)]
    pub parent_id: Option<RoomId>,
}

/// A room registered as a room-creation trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRoom {
    pub room_id: RoomId,
    pub guild_id: GuildId,
    /// Admin who registered the trigger
    pub added_by: Option<MemberId>,
    pub added_at: DateTime<Utc>,
}

impl TriggerRoom {
    pub fn new(room_id: RoomId, guild_id: GuildId) -> Self {
        Self {
            room_id,
            guild_id,
            added_by: None,
            added_at: Utc::now(),
        }
    }

    pub fn with_added_by(mut self, member: MemberId) -> Self {
        self.added_by = Some(member);
        self
    }
}

/// A room created and owned by JTC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicRoom {
    pub room_id: RoomId,
    pub guild_id: GuildId,
    /// Member the room was provisioned for (informational)
    pub owner: MemberId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl DynamicRoom {
    pub fn new(room: &Room, owner: MemberId) -> Self {
        Self {
            room_id: room.id.clone(),
            guild_id: room.guild_id.clone(),
            owner,
            name: room.name.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Render a room name from a template, substituting `{name}`
pub fn render_room_name(template: &str, member_name: &str) -> String {
    let name = member_name.trim();
    let name = if name.is_empty() { "Member" } else { name };
    template.replace("{name}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_room_name() {
        assert_eq!(render_room_name("{name}'s Channel", "alice"), "alice's Channel");
        assert_eq!(render_room_name("{name}'s Channel", "  "), "Member's Channel");
        assert_eq!(render_room_name("Lounge", "bob"), "Lounge");
    }

    #[test]
    fn test_unknown_room_kind_deserializes_as_other() {
        let kind: RoomKind = serde_json::from_str("\"stage\"").unwrap();
        assert_eq!(kind, RoomKind::Other);
    }
}
