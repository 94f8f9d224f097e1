//! JTC Core Library
//!
//! Join-to-create room lifecycle: trigger storage, membership tracking,
//! ownership of provisioned rooms, and the event processor that ties them to
//! the platform.

pub mod error;
pub mod invariants;
pub mod models;
pub mod orchestrator;
pub mod platform;
pub mod processor;
pub mod registry;
pub mod state;
pub mod storage;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use models::*;
pub use orchestrator::{Decision, MembershipUpdate, Orchestrator, DEFAULT_ROOM_NAME_TEMPLATE};
pub use platform::{ErrorReporter, PlatformSession, TracingReporter};
pub use processor::{EventProcessor, SharedTriggers};
pub use registry::DynamicRoomRegistry;
pub use state::{DynamicRoomStatus, LifecycleSnapshot, LifecycleState, RoomPhase};
pub use storage::{Database, TriggerRepository, TriggerStore};
pub use tracker::MembershipTracker;
