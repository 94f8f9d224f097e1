//! JTC Network Library
//!
//! Bridges the lifecycle core to a chat platform through a gateway sidecar.
//!
//! # Architecture
//!
//! - **GatewayClient**: TCP connection to the gateway, yields events
//! - **GatewayHandle**: cloneable sender side, implements `PlatformSession`
//! - **Protocol**: Length-prefixed JSON messages
//!
//! # Usage
//!
//! ```ignore
//! let mut client = GatewayClient::connect("127.0.0.1:7331", &token, timeout).await?;
//! let platform: Arc<dyn PlatformSession> = Arc::new(client.handle());
//!
//! while let Some(event) = client.next_event().await {
//!     match event {
//!         GatewayEvent::VoiceStateUpdate(event) => processor.handle(event).await,
//!         GatewayEvent::Interaction(interaction) => { /* admin commands */ }
//!         GatewayEvent::Disconnected => break,
//!     }
//! }
//! ```

pub mod client;
pub mod error;
mod frame;
pub mod protocol;
mod session;

#[cfg(test)]
mod testing;

pub use client::{ConnectionState, GatewayClient, GatewayEvent, GatewayHandle};
pub use error::{Error, Result};
pub use protocol::{CallResult, Interaction, Message, PlatformCall, RemoteErrorKind};

/// Default gateway port
pub const DEFAULT_PORT: u16 = 7331;
