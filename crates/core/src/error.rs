//! Error types for JTC Core

use thiserror::Error;

use crate::models::RoomId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Network or API failure on a platform call
    #[error("Platform unavailable: {0}")]
    PlatformUnavailable(String),

    /// Room or member vanished between decision and action
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Room {0} is already a trigger room")]
    DuplicateTrigger(RoomId),

    #[error("Room {0} is not a trigger room")]
    UnknownTrigger(RoomId),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True when the error reports a resource that no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
