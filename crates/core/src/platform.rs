//! Platform collaborator interfaces
//!
//! The chat platform is reached only through these traits. Every call is a
//! network round trip that may fail; implementations map transport failures
//! to `Error::PlatformUnavailable` and vanished resources to `Error::NotFound`.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{GuildId, MemberId, MembershipEvent, Room, RoomId};

#[async_trait]
pub trait PlatformSession: Send + Sync {
    /// Fetch a room (`NotFound` if it no longer exists)
    async fn get_room(&self, room: &RoomId) -> Result<Room>;

    /// Create a voice room, optionally nested under `parent`
    async fn create_room(
        &self,
        guild: &GuildId,
        name: &str,
        parent: Option<&RoomId>,
    ) -> Result<Room>;

    /// Move a member into a room
    async fn move_member(&self, guild: &GuildId, member: &MemberId, room: &RoomId) -> Result<()>;

    /// Delete a room
    async fn delete_room(&self, room: &RoomId) -> Result<()>;
}

/// Sink for human-readable diagnostics about failed events
pub trait ErrorReporter: Send + Sync {
    fn report(&self, event: &MembershipEvent, error: &Error);
}

/// Reports failures through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, event: &MembershipEvent, error: &Error) {
        match error {
            Error::InvalidEvent(_) | Error::NotFound(_) => tracing::warn!(
                member_id = %event.member,
                guild_id = %event.guild,
                previous = ?event.previous_room,
                current = ?event.current_room,
                error = %error,
                "Membership event not applied"
            ),
            _ => tracing::error!(
                member_id = %event.member,
                guild_id = %event.guild,
                previous = ?event.previous_room,
                current = ?event.current_room,
                error = %error,
                "Membership event failed"
            ),
        }
    }
}
