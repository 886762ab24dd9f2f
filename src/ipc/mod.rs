//! IPC module for daemon-player communication

mod client;
mod protocol;

pub use client::PlayerClient;
pub use protocol::{PlayerReply, PlayerRequest, PlayerStatus};
