//! Shared types for the Serene client core.

mod api;
mod chat;
mod crisis;
mod mood;

pub use api::*;
pub use chat::*;
pub use crisis::*;
pub use mood::*;
