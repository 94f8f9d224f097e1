//! Test doubles for the app crate

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jtc_core::{
    Database, Error, GuildId, MemberId, PlatformSession, Result, Room, RoomId, RoomKind,
    SharedTriggers, TriggerRoom,
};

/// Platform that records calls as short strings
#[derive(Default)]
pub struct RecordingPlatform {
    rooms: Mutex<HashMap<RoomId, Room>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicU64,
    delay: Duration,
}

impl RecordingPlatform {
    /// Knows a voice room called `trigger` in guild `g`
    pub fn new() -> Self {
        Self::default().with_room("trigger", "g", RoomKind::Voice)
    }

    pub fn with_room(self, id: &str, guild: &str, kind: RoomKind) -> Self {
        let room = Room {
            id: RoomId::new(id),
            guild_id: GuildId::new(guild),
            name: format!("#{}", id),
            kind,
            parent_id: None,
        };
        self.rooms.lock().unwrap().insert(room.id.clone(), room);
        self
    }

    /// Slow every call down, to let concurrent tasks interleave
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: String) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlatformSession for RecordingPlatform {
    async fn get_room(&self, room: &RoomId) -> Result<Room> {
        self.record(format!("get_room {}", room)).await;
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
        self.record(format!("create_room {}", name)).await;
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
        Ok(room)
    }

    async fn move_member(&self, _guild: &GuildId, member: &MemberId, room: &RoomId) -> Result<()> {
        self.record(format!("move_member {} {}", member, room)).await;
        Ok(())
    }

    async fn delete_room(&self, room: &RoomId) -> Result<()> {
        self.record(format!("delete_room {}", room)).await;
        self.rooms.lock().unwrap().remove(room);
        Ok(())
    }
}

/// In-memory trigger registry
pub struct TestTriggers;

impl TestTriggers {
    /// Registry with the given rooms of guild `g` as triggers
    pub fn with(rooms: &[&str]) -> SharedTriggers {
        let db = Database::open_in_memory().unwrap();
        for room in rooms {
            db.triggers()
                .add(&TriggerRoom::new(RoomId::new(*room), GuildId::new("g")))
                .unwrap();
        }
        Arc::new(Mutex::new(db))
    }
}
