//! Admin command surface
//!
//! `jtc set|unset <room>` manage trigger rooms, `jtc list|status` report on
//! them, `ping` and `help` are informational. Every command produces exactly
//! one text reply.

use std::sync::{Arc, MutexGuard};

use jtc_core::{
    Error, EventProcessor, PlatformSession, Room, RoomId, RoomKind, SharedTriggers,
    TriggerRepository, TriggerRoom,
};
use jtc_net::Interaction;
use tracing::{info, warn};

use crate::gateway::GatewaySlot;

pub const USAGE: &str = "\
Usage:
  /jtc set <room>    Make a voice room a join-to-create trigger (admin)
  /jtc unset <room>  Stop using a room as a trigger (admin)
  /jtc list          List this server's trigger rooms
  /jtc status        Show rooms created by JTC
  /ping              Gateway latency
  /help              This message";

const NOT_ADMIN: &str = "You need the Administrator permission to use this command.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set(RoomId),
    Unset(RoomId),
    List,
    Status,
    Ping,
    Help,
}

impl Command {
    /// Parse an interaction; `Err` carries the usage reply
    pub fn parse(interaction: &Interaction) -> Result<Self, String> {
        let mut options = interaction.options.iter().map(|o| o.trim());
        match interaction.command.as_str() {
            "ping" => Ok(Command::Ping),
            "help" => Ok(Command::Help),
            "jtc" => match options.next() {
                Some("set") => room_option(options.next()).map(Command::Set),
                Some("unset") => room_option(options.next()).map(Command::Unset),
                Some("list") => Ok(Command::List),
                Some("status") => Ok(Command::Status),
                _ => Err(USAGE.to_string()),
            },
            _ => Err(USAGE.to_string()),
        }
    }

    fn requires_admin(&self) -> bool {
        matches!(self, Command::Set(_) | Command::Unset(_))
    }
}

/// Accepts a bare id or a `<#id>` mention
fn room_option(option: Option<&str>) -> Result<RoomId, String> {
    let raw = option.unwrap_or_default();
    let id = raw
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(raw)
        .trim();
    if id.is_empty() {
        Err(USAGE.to_string())
    } else {
        Ok(RoomId::new(id))
    }
}

pub struct CommandHandler {
    triggers: SharedTriggers,
    processor: Arc<EventProcessor>,
    platform: Arc<dyn PlatformSession>,
    gateway: Arc<GatewaySlot>,
}

impl CommandHandler {
    pub fn new(
        triggers: SharedTriggers,
        processor: Arc<EventProcessor>,
        platform: Arc<dyn PlatformSession>,
        gateway: Arc<GatewaySlot>,
    ) -> Self {
        Self {
            triggers,
            processor,
            platform,
            gateway,
        }
    }

    /// Run an interaction and build its reply
    pub async fn respond(&self, interaction: &Interaction) -> String {
        let command = match Command::parse(interaction) {
            Ok(command) => command,
            Err(usage) => return usage,
        };
        if command.requires_admin() && !interaction.is_admin {
            info!(
                member_id = %interaction.member,
                guild_id = %interaction.guild,
                command = ?command,
                "Refused admin command"
            );
            return NOT_ADMIN.to_string();
        }

        match command {
            Command::Set(room) => self.set(interaction, &room).await,
            Command::Unset(room) => self.unset(interaction, &room).await,
            Command::List => self.list(interaction),
            Command::Status => self.status(interaction).await,
            Command::Ping => self.ping().await,
            Command::Help => USAGE.to_string(),
        }
    }

    async fn set(&self, interaction: &Interaction, room_id: &RoomId) -> String {
        let room = match self.platform.get_room(room_id).await {
            Ok(room) => room,
            Err(e) if e.is_not_found() => return format!("Room {} does not exist.", room_id),
            Err(e) => return format!("Could not look up room {}: {}", room_id, e),
        };
        if room.guild_id != interaction.guild {
            return format!("Room {} is not in this server.", room_id);
        }
        if room.kind != RoomKind::Voice {
            return format!(
                "{} is a {} room, not a voice room.",
                room.name,
                room.kind.display_name()
            );
        }
        if self.processor.is_dynamic(&room.id).await {
            return format!(
                "{} was created by JTC and cannot be a trigger room.",
                room.name
            );
        }

        let trigger = TriggerRoom::new(room.id.clone(), room.guild_id.clone())
            .with_added_by(interaction.member.clone());
        let added = self.lock_triggers().add_trigger(&trigger);
        match added {
            Ok(()) => {
                info!(
                    room_id = %room.id,
                    guild_id = %room.guild_id,
                    added_by = %interaction.member,
                    "Trigger room added"
                );
                format!("{} is now a join-to-create room.", room.name)
            }
            Err(Error::DuplicateTrigger(_)) => {
                format!("{} is already a join-to-create room.", room.name)
            }
            Err(e) => {
                warn!(room_id = %room.id, error = %e, "Failed to add trigger room");
                format!("Failed to save trigger room: {}", e)
            }
        }
    }

    async fn unset(&self, interaction: &Interaction, room_id: &RoomId) -> String {
        let label = match self.platform.get_room(room_id).await {
            Ok(Room { guild_id, .. }) if guild_id != interaction.guild => {
                return format!("Room {} is not in this server.", room_id);
            }
            Ok(room) => room.name,
            // Already deleted on the platform, still allowed to unregister
            Err(e) if e.is_not_found() => room_id.to_string(),
            Err(e) => return format!("Could not look up room {}: {}", room_id, e),
        };

        let removed = self.lock_triggers().remove_trigger(room_id);
        match removed {
            Ok(()) => {
                info!(
                    room_id = %room_id,
                    guild_id = %interaction.guild,
                    removed_by = %interaction.member,
                    "Trigger room removed"
                );
                format!("{} is no longer a join-to-create room.", label)
            }
            Err(Error::UnknownTrigger(_)) => format!("{} is not a join-to-create room.", label),
            Err(e) => {
                warn!(room_id = %room_id, error = %e, "Failed to remove trigger room");
                format!("Failed to remove trigger room: {}", e)
            }
        }
    }

    fn list(&self, interaction: &Interaction) -> String {
        let triggers = self.lock_triggers().list_guild_triggers(&interaction.guild);
        match triggers {
            Ok(triggers) if triggers.is_empty() => {
                "No join-to-create rooms are configured.".to_string()
            }
            Ok(triggers) => {
                let mut reply = String::from("Join-to-create rooms:");
                for trigger in triggers {
                    reply.push_str(&format!(
                        "\n- <#{}> (added {})",
                        trigger.room_id,
                        trigger.added_at.format("%Y-%m-%d")
                    ));
                }
                reply
            }
            Err(e) => format!("Failed to list trigger rooms: {}", e),
        }
    }

    async fn status(&self, interaction: &Interaction) -> String {
        let snapshot = self.processor.snapshot().await;
        let rooms: Vec<_> = snapshot.for_guild(&interaction.guild).collect();
        if rooms.is_empty() {
            return "No rooms created by JTC right now.".to_string();
        }

        let mut reply = format!("{} room(s) created by JTC:", rooms.len());
        for room in rooms {
            reply.push_str(&format!(
                "\n- {} (<#{}>) for <@{}>, {} member(s)",
                room.name, room.room_id, room.owner, room.occupancy
            ));
        }
        reply
    }

    async fn ping(&self) -> String {
        let Some(handle) = self.gateway.handle().await else {
            return "Not connected to the gateway.".to_string();
        };
        match handle.ping().await {
            Ok(rtt) => format!("Pong! Gateway latency: {} ms", rtt.as_millis()),
            Err(e) => format!("Ping failed: {}", e),
        }
    }

    fn lock_triggers(&self) -> MutexGuard<'_, dyn TriggerRepository + 'static> {
        self.triggers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
