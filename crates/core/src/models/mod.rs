//! Data models for JTC

mod event;
mod ids;
mod room;

pub use event::*;
pub use ids::*;
pub use room::*;
