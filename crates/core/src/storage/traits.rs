//! Storage repository traits
//!
//! The lifecycle core reads and writes trigger rooms only through this trait,
//! so tests and alternative backends can stand in for SQLite.

use crate::error::Result;
use crate::models::{GuildId, RoomId, TriggerRoom};

/// Durable set of trigger rooms
pub trait TriggerRepository: Send {
    /// Register a trigger room (`DuplicateTrigger` if already present)
    fn add_trigger(&self, trigger: &TriggerRoom) -> Result<()>;

    /// Remove a trigger room (`UnknownTrigger` if absent)
    fn remove_trigger(&self, room_id: &RoomId) -> Result<()>;

    /// Check whether a room is a trigger room
    fn is_trigger(&self, room_id: &RoomId) -> Result<bool>;

    /// List all trigger rooms
    fn list_triggers(&self) -> Result<Vec<TriggerRoom>>;

    /// List trigger rooms of one guild
    fn list_guild_triggers(&self, guild_id: &GuildId) -> Result<Vec<TriggerRoom>>;
}
