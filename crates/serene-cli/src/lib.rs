//! Serene terminal client.
//!
//! Kept separate from main.rs so the commands can be unit tested.

pub mod commands;
pub mod config;
pub mod logging;
pub mod render;
