//! Subcommand implementations.

pub mod breathe;
pub mod chat;
pub mod mood;
