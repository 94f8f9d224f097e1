//! Platform session over the gateway connection

use async_trait::async_trait;
use jtc_core::{GuildId, MemberId, PlatformSession, Room, RoomId};

use crate::client::GatewayHandle;
use crate::error::Error;
use crate::protocol::PlatformCall;

fn expect_room(room: Option<Room>, call: &str) -> Result<Room, Error> {
    room.ok_or_else(|| Error::Protocol(format!("{} response carried no room", call)))
}

#[async_trait]
impl PlatformSession for GatewayHandle {
    async fn get_room(&self, room: &RoomId) -> jtc_core::Result<Room> {
        let found = self
            .request(PlatformCall::GetRoom { room: room.clone() })
            .await?;
        Ok(expect_room(found, "get_room")?)
    }

    async fn create_room(
        &self,
        guild: &GuildId,
        name: &str,
        parent: Option<&RoomId>,
    ) -> jtc_core::Result<Room> {
        let created = self
            .request(PlatformCall::CreateRoom {
                guild: guild.clone(),
                name: name.to_string(),
                parent: parent.cloned(),
            })
            .await?;
        Ok(expect_room(created, "create_room")?)
    }

    async fn move_member(
        &self,
        guild: &GuildId,
        member: &MemberId,
        room: &RoomId,
    ) -> jtc_core::Result<()> {
        self.request(PlatformCall::MoveMember {
            guild: guild.clone(),
            member: member.clone(),
            room: room.clone(),
        })
        .await?;
        Ok(())
    }

    async fn delete_room(&self, room: &RoomId) -> jtc_core::Result<()> {
        self.request(PlatformCall::DeleteRoom { room: room.clone() })
            .await?;
        Ok(())
    }
}
