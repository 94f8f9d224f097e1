//! Trigger room storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;

use super::parse::{is_constraint_violation, parse_datetime, OptionalExt};
use crate::error::{Error, Result};
use crate::models::{GuildId, MemberId, RoomId, TriggerRoom};

pub struct TriggerStore<'a> {
    conn: &'a Connection,
}

fn trigger_from_row(row: &Row<'_>) -> rusqlite::Result<TriggerRoom> {
    Ok(TriggerRoom {
        room_id: RoomId(row.get(0)?),
        guild_id: GuildId(row.get(1)?),
        added_by: row.get::<_, Option<String>>(2)?.map(MemberId),
        added_at: parse_datetime(&row.get::<_, String>(3)?)?,
    })
}

impl<'a> TriggerStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Register a trigger room. A second insert of the same room fails with
    /// `DuplicateTrigger` and leaves the stored row untouched.
    #[instrument(skip(self, trigger), fields(room_id = %trigger.room_id, guild_id = %trigger.guild_id))]
    pub fn add(&self, trigger: &TriggerRoom) -> Result<()> {
        let inserted = self.conn.execute(
            "INSERT INTO trigger_rooms (room_id, guild_id, added_by, added_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                trigger.room_id.as_str(),
                trigger.guild_id.as_str(),
                trigger.added_by.as_ref().map(|m| m.as_str()),
                trigger.added_at.to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => {
                Err(Error::DuplicateTrigger(trigger.room_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a trigger room
    #[instrument(skip(self))]
    pub fn remove(&self, room_id: &RoomId) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM trigger_rooms WHERE room_id = ?1",
            params![room_id.as_str()],
        )?;
        if removed == 0 {
            return Err(Error::UnknownTrigger(room_id.clone()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn contains(&self, room_id: &RoomId) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM trigger_rooms WHERE room_id = ?1",
                params![room_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn get(&self, room_id: &RoomId) -> Result<Option<TriggerRoom>> {
        let trigger = self
            .conn
            .query_row(
                "SELECT room_id, guild_id, added_by, added_at FROM trigger_rooms WHERE room_id = ?1",
                params![room_id.as_str()],
                trigger_from_row,
            )
            .optional()?;
        Ok(trigger)
    }

    /// List every trigger room, oldest first
    pub fn list(&self) -> Result<Vec<TriggerRoom>> {
        let mut stmt = self.conn.prepare(
            "SELECT room_id, guild_id, added_by, added_at FROM trigger_rooms
             ORDER BY added_at, room_id",
        )?;
        let triggers = stmt
            .query_map([], trigger_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(triggers)
    }

    /// List the trigger rooms of one guild, oldest first
    pub fn list_for_guild(&self, guild_id: &GuildId) -> Result<Vec<TriggerRoom>> {
        let mut stmt = self.conn.prepare(
            "SELECT room_id, guild_id, added_by, added_at FROM trigger_rooms
             WHERE guild_id = ?1
             ORDER BY added_at, room_id",
        )?;
        let triggers = stmt
            .query_map(params![guild_id.as_str()], trigger_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(triggers)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::models::{GuildId, MemberId, RoomId, TriggerRoom};
    use crate::storage::Database;
    use tempfile::tempdir;

    fn trigger(room: &str, guild: &str) -> TriggerRoom {
        TriggerRoom::new(RoomId::new(room), GuildId::new(guild))
    }

    #[test]
    fn test_add_and_contains() {
        let db = Database::open_in_memory().unwrap();
        let store = db.triggers();

        assert!(!store.contains(&RoomId::new("trigger1")).unwrap());
        store
            .add(&trigger("trigger1", "g1").with_added_by(MemberId::new("admin")))
            .unwrap();
        assert!(store.contains(&RoomId::new("trigger1")).unwrap());

        let stored = store.get(&RoomId::new("trigger1")).unwrap().unwrap();
        assert_eq!(stored.guild_id, GuildId::new("g1"));
        assert_eq!(stored.added_by, Some(MemberId::new("admin")));
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let store = db.triggers();

        store.add(&trigger("trigger1", "g1")).unwrap();
        let err = store.add(&trigger("trigger1", "g2")).unwrap_err();
        assert!(matches!(err, Error::DuplicateTrigger(ref r) if r.as_str() == "trigger1"));

        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].guild_id, GuildId::new("g1"));
    }

    #[test]
    fn test_remove_unknown_trigger() {
        let db = Database::open_in_memory().unwrap();
        let store = db.triggers();

        let err = store.remove(&RoomId::new("nope")).unwrap_err();
        assert!(matches!(err, Error::UnknownTrigger(_)));

        store.add(&trigger("t", "g")).unwrap();
        store.remove(&RoomId::new("t")).unwrap();
        assert!(!store.contains(&RoomId::new("t")).unwrap());
    }

    #[test]
    fn test_list_for_guild() {
        let db = Database::open_in_memory().unwrap();
        let store = db.triggers();
        store.add(&trigger("a", "g1")).unwrap();
        store.add(&trigger("b", "g2")).unwrap();
        store.add(&trigger("c", "g1")).unwrap();

        let rooms: Vec<String> = store
            .list_for_guild(&GuildId::new("g1"))
            .unwrap()
            .into_iter()
            .map(|t| t.room_id.0)
            .collect();
        assert_eq!(rooms.len(), 2);
        assert!(rooms.contains(&"a".to_string()));
        assert!(rooms.contains(&"c".to_string()));
    }

    #[test]
    fn test_triggers_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jtc.db");

        {
            let db = Database::open(&path).unwrap();
            db.triggers().add(&trigger("persisted", "g")).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert!(db.triggers().contains(&RoomId::new("persisted")).unwrap());
    }
}
