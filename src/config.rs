//! Configuration loading and management
//!
//! Bindings are persisted per action name as a (code, mask, kind) triple;
//! actions missing from the file fall back to the default binding table
//! below. The file lives under the XDG config directory and is re-read on
//! SIGHUP, which swaps the whole binding set.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::events::Action;
use crate::hotkey::keysyms;
use crate::hotkey::BindingKind;

/// Default shortcut table: one entry per action, in match-priority order.
/// Actions with a non-zero keysym default to that media key; the rest
/// start unbound.
pub(crate) const DEFAULT_BINDINGS: &[(Action, u32)] = &[
    (Action::Mute, keysyms::XF86_AUDIO_MUTE),
    (Action::VolumeDown, keysyms::XF86_AUDIO_LOWER_VOLUME),
    (Action::VolumeUp, keysyms::XF86_AUDIO_RAISE_VOLUME),
    (Action::Play, keysyms::XF86_AUDIO_PLAY),
    (Action::Pause, keysyms::XF86_AUDIO_PAUSE),
    (Action::Stop, keysyms::XF86_AUDIO_STOP),
    (Action::PrevTrack, keysyms::XF86_AUDIO_PREV),
    (Action::NextTrack, keysyms::XF86_AUDIO_NEXT),
    (Action::JumpToFile, keysyms::XF86_AUDIO_MEDIA),
    (Action::ToggleWindows, 0),
    (Action::Forward, 0),
    (Action::Backward, keysyms::XF86_AUDIO_REWIND),
    (Action::ShowOsd, 0),
];

/// One persisted binding: key-or-button code, modifier mask, kind.
/// A code of 0 stores "explicitly unbound".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBinding {
    pub code: u8,
    pub mask: u16,
    pub kind: BindingKind,
}

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Volume step for the volume-up shortcut, percent
    pub volume_increment: u8,

    /// Volume step for the volume-down shortcut, percent
    pub volume_decrement: u8,

    /// Player control socket; defaults to the player's well-known path
    pub player_socket: Option<PathBuf>,

    /// Bindings keyed by action name; absent actions use the defaults
    pub bindings: HashMap<String, StoredBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            volume_increment: 4,
            volume_decrement: 4,
            player_socket: None,
            bindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default path. A missing file yields
    /// the defaults (and is materialized so there is a file to edit);
    /// a malformed file is an error.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = Self::load_from(&path)?;
        if !path.exists() {
            config
                .save_to(&path)
                .context("failed to write default config")?;
            info!(path = %path.display(), "wrote default config");
        }
        Ok(config)
    }

    pub(crate) fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => {
                Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        }
    }

    /// Persist the configuration, creating parent directories as needed
    pub(crate) fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("failed to create config directory")?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    fn config_path() -> Result<PathBuf> {
        let base = match std::env::var("XDG_CONFIG_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let home = std::env::var("HOME").context("HOME is not set")?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("mediakeyd").join("config.json"))
    }

    /// Path of the player's control socket
    pub fn player_socket_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.player_socket {
            return Ok(path.clone());
        }
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("mediakeyd")
            .join("player.sock"))
    }
}
