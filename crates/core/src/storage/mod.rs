//! SQLite storage layer for JTC

mod migrations;
mod parse;
mod traits;
mod triggers;

use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;

use crate::error::Result;
use crate::models::{GuildId, RoomId, TriggerRoom};

pub use traits::TriggerRepository;
pub use triggers::TriggerStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        migrations::run_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        migrations::current_version(&self.conn).unwrap_or(0)
    }

    /// Get trigger room store
    pub fn triggers(&self) -> TriggerStore<'_> {
        TriggerStore::new(&self.conn)
    }
}

impl TriggerRepository for Database {
    fn add_trigger(&self, trigger: &TriggerRoom) -> Result<()> {
        self.triggers().add(trigger)
    }

    fn remove_trigger(&self, room_id: &RoomId) -> Result<()> {
        self.triggers().remove(room_id)
    }

    fn is_trigger(&self, room_id: &RoomId) -> Result<bool> {
        self.triggers().contains(room_id)
    }

    fn list_triggers(&self) -> Result<Vec<TriggerRoom>> {
        self.triggers().list()
    }

    fn list_guild_triggers(&self, guild_id: &GuildId) -> Result<Vec<TriggerRoom>> {
        self.triggers().list_for_guild(guild_id)
    }
}
