//! Gateway connection management
//!
//! The processor keeps one `PlatformSession` for its whole life; the slot
//! forwards to whichever gateway connection is currently live.

use std::time::Duration;

use async_trait::async_trait;
use jtc_core::{GuildId, MemberId, PlatformSession, Room, RoomId};
use jtc_net::{GatewayClient, GatewayHandle};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};

/// Backoff delays between connection attempts, last one repeats
const RECONNECT_DELAYS_MS: [u64; 5] = [1000, 2000, 5000, 10000, 30000];

/// Holder for the live gateway handle
#[derive(Default)]
pub struct GatewaySlot {
    current: RwLock<Option<GatewayHandle>>,
}

impl GatewaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, handle: Option<GatewayHandle>) {
        *self.current.write().await = handle;
    }

    pub async fn handle(&self) -> Option<GatewayHandle> {
        self.current.read().await.clone()
    }

    async fn live(&self) -> jtc_core::Result<GatewayHandle> {
        self.handle()
            .await
            .ok_or_else(|| jtc_core::Error::PlatformUnavailable("gateway not connected".into()))
    }
}

#[async_trait]
impl PlatformSession for GatewaySlot {
    async fn get_room(&self, room: &RoomId) -> jtc_core::Result<Room> {
        self.live().await?.get_room(room).await
    }

    async fn create_room(
        &self,
        guild: &GuildId,
        name: &str,
        parent: Option<&RoomId>,
    ) -> jtc_core::Result<Room> {
        self.live().await?.create_room(guild, name, parent).await
    }

    async fn move_member(
        &self,
        guild: &GuildId,
        member: &MemberId,
        room: &RoomId,
    ) -> jtc_core::Result<()> {
        self.live().await?.move_member(guild, member, room).await
    }

    async fn delete_room(&self, room: &RoomId) -> jtc_core::Result<()> {
        self.live().await?.delete_room(room).await
    }
}

/// Connect to the gateway, retrying with backoff until it succeeds
///
/// A rejected handshake is not retried: the token will not get better.
pub async fn connect_with_backoff(config: &Config) -> Result<GatewayClient> {
    let mut attempt = 0usize;
    loop {
        info!(attempt = attempt + 1, addr = %config.gateway_addr, "Gateway connect attempt");

        match GatewayClient::connect(
            config.gateway_addr.as_str(),
            config.token(),
            config.request_timeout(),
        )
        .await
        {
            Ok(client) => return Ok(client),
            Err(e @ jtc_net::Error::Rejected(_)) => return Err(AppError::Gateway(e)),
            Err(e) => warn!(error = %e, "Gateway connection attempt failed"),
        }

        let delay_ms = RECONNECT_DELAYS_MS[attempt.min(RECONNECT_DELAYS_MS.len() - 1)];
        info!(delay_ms = delay_ms, "Reconnect backoff");
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}
