//! Gateway protocol message types
//!
//! All messages are JSON-serialized and length-prefixed on the wire.

use jtc_core::{GuildId, MemberId, MembershipEvent, Room, RoomId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Protocol version sent in the handshake
pub const PROTOCOL_VERSION: u32 = 1;

/// A slash command invocation relayed by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub guild: GuildId,
    pub member: MemberId,
    #[serde(default)]
    pub member_name: String,
    /// Whether the invoking member holds the administrator permission
    #[serde(default)]
    pub is_admin: bool,
    /// Command name, e.g. `jtc` or `ping`
    pub command: String,
    /// Positional options, e.g. `["set", "1234"]`
    #[serde(default)]
    pub options: Vec<String>,
}

/// A platform operation requested by the bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum PlatformCall {
    GetRoom {
        room: RoomId,
    },
    CreateRoom {
        guild: GuildId,
        name: String,
        parent: Option<RoomId>,
    },
    MoveMember {
        guild: GuildId,
        member: MemberId,
        room: RoomId,
    },
    DeleteRoom {
        room: RoomId,
    },
}

impl PlatformCall {
    pub fn name(&self) -> &'static str {
        match self {
            PlatformCall::GetRoom { .. } => "get_room",
            PlatformCall::CreateRoom { .. } => "create_room",
            PlatformCall::MoveMember { .. } => "move_member",
            PlatformCall::DeleteRoom { .. } => "delete_room",
        }
    }
}

/// Failure category reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    NotFound,
    Forbidden,
    RateLimited,
    #[serde(other)]
    Unavailable,
}

/// Outcome of a platform call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallResult {
    Ok {
        #[serde(default)]
        room: Option<Room>,
    },
    Error {
        kind: RemoteErrorKind,
        message: String,
    },
}

/// Gateway protocol messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Bot identifies itself to the gateway
    Hello { token: String, version: u32 },

    /// Gateway accepts the handshake
    Ready { bot_id: MemberId },

    /// Gateway refuses the handshake
    Rejected { reason: String },

    /// A member changed rooms (or toggled mute, deafen, ...)
    VoiceStateUpdate(MembershipEvent),

    /// A command was invoked
    Interaction(Interaction),

    /// Reply to a command
    InteractionReply {
        interaction_id: String,
        content: String,
    },

    /// Platform call from the bot
    Request { id: Uuid, call: PlatformCall },

    /// Gateway answer to a `Request`
    Response { id: Uuid, result: CallResult },

    Ping,

    Pong,
}

impl Message {
    /// Serialize message to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize message from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
