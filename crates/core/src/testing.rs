//! In-memory platform for exercising the processor without a gateway

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{GuildId, MemberId, Room, RoomId, RoomKind};
use crate::platform::PlatformSession;

/// A platform call as observed by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetRoom(RoomId),
    CreateRoom {
        guild: GuildId,
        name: String,
        parent: Option<RoomId>,
    },
    MoveMember {
        member: MemberId,
        room: RoomId,
    },
    DeleteRoom(RoomId),
}

/// Which calls should fail, and how
#[derive(Debug, Default, Clone, Copy)]
pub struct Failures {
    pub create: bool,
    pub move_member: bool,
    pub delete: bool,
    /// Report deletions as `NotFound` instead of succeeding
    pub delete_not_found: bool,
}

#[derive(Default)]
pub struct FakePlatform {
    rooms: Mutex<HashMap<RoomId, Room>>,
    calls: Mutex<Vec<Call>>,
    created: Mutex<Vec<RoomId>>,
    failures: Mutex<Failures>,
    next_id: AtomicU64,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing voice room
    pub fn with_room(self, id: &str, guild: &str, parent: Option<&str>) -> Self {
        let room = Room {
            id: RoomId::new(id),
            guild_id: GuildId::new(guild),
            name: id.to_string(),
            kind: RoomKind::Voice,
            parent_id: parent.map(RoomId::new),
        };
        self.rooms.lock().unwrap().insert(room.id.clone(), room);
        self
    }

    pub fn set_failures(&self, failures: Failures) {
        *self.failures.lock().unwrap() = failures;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Rooms successfully created, in creation order
    pub fn created_rooms(&self) -> Vec<RoomId> {
        self.created.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn room_exists(&self, id: &RoomId) -> bool {
        self.rooms.lock().unwrap().contains_key(id)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn failures(&self) -> Failures {
        *self.failures.lock().unwrap()
    }
}

#[async_trait]
impl PlatformSession for FakePlatform {
    async fn get_room(&self, room: &RoomId) -> Result<Room> {
        self.record(Call::GetRoom(room.clone()));
        self.rooms
            .lock()
            .unwrap()
            .get(room)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("room {}", room)))
    }

    async fn create_room(
        &self,
        guild: &GuildId,
        name: &str,
        parent: Option<&RoomId>,
    ) -> Result<Room> {
        self.record(Call::CreateRoom {
            guild: guild.clone(),
            name: name.to_string(),
            parent: parent.cloned(),
        });
        if self.failures().create {
            return Err(Error::PlatformUnavailable("create refused".into()));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let room = Room {
            id: RoomId::new(format!("dyn-{}", n)),
            guild_id: guild.clone(),
            name: name.to_string(),
            kind: RoomKind::Voice,
            parent_id: parent.cloned(),
        };
        self.rooms
            .lock()
            .unwrap()
            .insert(room.id.clone(), room.clone());
        self.created.lock().unwrap().push(room.id.clone());
        Ok(room)
    }

    async fn move_member(&self, _guild: &GuildId, member: &MemberId, room: &RoomId) -> Result<()> {
        self.record(Call::MoveMember {
            member: member.clone(),
            room: room.clone(),
        });
        if self.failures().move_member {
            return Err(Error::PlatformUnavailable("move refused".into()));
        }
        Ok(())
    }

    async fn delete_room(&self, room: &RoomId) -> Result<()> {
        self.record(Call::DeleteRoom(room.clone()));
        let failures = self.failures();
        if failures.delete {
            return Err(Error::PlatformUnavailable("delete refused".into()));
        }
        if failures.delete_not_found {
            self.rooms.lock().unwrap().remove(room);
            return Err(Error::NotFound(format!("room {}", room)));
        }
        self.rooms.lock().unwrap().remove(room);
        Ok(())
    }
}
