//! Shortcut action dispatch toward the player
//!
//! Consumes matched shortcut actions from the listener and turns them
//! into player commands. Commands are fire-and-forget: a failed or
//! rejected command is logged and never feeds back into matching.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::events::Action;
use crate::hotkey::ListenerEvent;
use crate::ipc::{PlayerClient, PlayerReply, PlayerRequest, PlayerStatus};

/// Seek step for the forward/backward shortcuts
const SEEK_OFFSET_MS: u64 = 5000;

/// Volume restored by unmute when there is nothing stashed
const UNMUTE_FALLBACK_VOLUME: u8 = 50;

const MAX_VOLUME: u8 = 100;

/// Dispatches listener events as player commands
pub struct Controller {
    client: PlayerClient,
    volume_increment: u8,
    volume_decrement: u8,
    /// Volume stashed by the last mute, restored on unmute
    restore_volume: Option<u8>,
}

impl Controller {
    pub fn new(client: PlayerClient, config: &Config) -> Self {
        Self {
            client,
            volume_increment: config.volume_increment,
            volume_decrement: config.volume_decrement,
            restore_volume: None,
        }
    }

    /// Run the dispatch loop until the listener side closes the channel
    pub async fn run(&mut self, mut rx: mpsc::Receiver<ListenerEvent>) {
        info!("controller started");

        while let Some(event) = rx.recv().await {
            match event {
                ListenerEvent::Action(action) => self.dispatch(action).await,
                ListenerEvent::ConnectionLost => {
                    warn!("X connection lost, shortcuts inactive until restart");
                }
            }
        }

        info!("controller stopped");
    }

    async fn dispatch(&mut self, action: Action) {
        debug!(%action, "dispatching shortcut action");
        match action {
            Action::Mute => self.toggle_mute().await,
            Action::VolumeDown => self.step_volume(VolumeStep::Down).await,
            Action::VolumeUp => self.step_volume(VolumeStep::Up).await,
            Action::Play => self.send(PlayerRequest::Play).await,
            Action::Pause => self.toggle_pause().await,
            Action::Stop => self.send(PlayerRequest::Stop).await,
            Action::PrevTrack => self.send(PlayerRequest::PrevTrack).await,
            Action::NextTrack => self.send(PlayerRequest::NextTrack).await,
            Action::JumpToFile => self.send(PlayerRequest::JumpToFile).await,
            Action::ToggleWindows => self.send(PlayerRequest::ToggleWindows).await,
            Action::Forward => self.seek(Seek::Forward).await,
            Action::Backward => self.seek(Seek::Backward).await,
            Action::ShowOsd => self.send(PlayerRequest::ShowOsd).await,
        }
    }

    /// Fire-and-forget command
    async fn send(&mut self, request: PlayerRequest) {
        match self.client.request(&request).await {
            Ok(PlayerReply::Error { code, message }) => {
                warn!(code, message, "player rejected command");
            }
            Ok(_) => {}
            Err(e) => warn!(?e, "player command failed"),
        }
    }

    async fn status(&mut self) -> Option<PlayerStatus> {
        match self.client.request(&PlayerRequest::Status).await {
            Ok(PlayerReply::Status(status)) => Some(status),
            Ok(other) => {
                warn!(?other, "unexpected reply to status query");
                None
            }
            Err(e) => {
                warn!(?e, "status query failed");
                None
            }
        }
    }

    async fn toggle_mute(&mut self) {
        let Some(status) = self.status().await else {
            return;
        };
        let level = mute_transition(status.volume, &mut self.restore_volume);
        self.send(PlayerRequest::SetVolume { level }).await;
    }

    async fn step_volume(&mut self, step: VolumeStep) {
        let Some(status) = self.status().await else {
            return;
        };
        let level = match step {
            VolumeStep::Up => raise_volume(status.volume, self.volume_increment),
            VolumeStep::Down => lower_volume(status.volume, self.volume_decrement),
        };
        if level != status.volume {
            self.send(PlayerRequest::SetVolume { level }).await;
        }
    }

    async fn toggle_pause(&mut self) {
        let Some(status) = self.status().await else {
            return;
        };
        if status.playing {
            self.send(PlayerRequest::Pause).await;
        } else {
            self.send(PlayerRequest::Play).await;
        }
    }

    async fn seek(&mut self, direction: Seek) {
        let Some(status) = self.status().await else {
            return;
        };
        let position_ms = match direction {
            Seek::Forward => status.position_ms + SEEK_OFFSET_MS,
            Seek::Backward => rewind_position(status.position_ms, SEEK_OFFSET_MS),
        };
        self.send(PlayerRequest::SeekTo { position_ms }).await;
    }
}

#[derive(Clone, Copy)]
enum VolumeStep {
    Up,
    Down,
}

#[derive(Clone, Copy)]
enum Seek {
    Forward,
    Backward,
}

/// Next volume for a mute toggle. A non-zero volume is stashed and cut
/// to zero; zero volume restores the stash, falling back to a fixed
/// level when nothing was stashed (so the player cannot get wedged
/// silent by muting twice before any volume query).
fn mute_transition(current: u8, stash: &mut Option<u8>) -> u8 {
    if current > 0 {
        *stash = Some(current);
        0
    } else {
        stash.take().unwrap_or(UNMUTE_FALLBACK_VOLUME)
    }
}

fn raise_volume(current: u8, step: u8) -> u8 {
    current.saturating_add(step).min(MAX_VOLUME)
}

fn lower_volume(current: u8, step: u8) -> u8 {
    current.saturating_sub(step)
}

fn rewind_position(position_ms: u64, offset_ms: u64) -> u64 {
    position_ms.saturating_sub(offset_ms)
}
