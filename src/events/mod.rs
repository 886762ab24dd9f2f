//! Named player actions triggered by global shortcuts
//!
//! Each action corresponds to one configurable binding. The declaration
//! order of the default binding table in [`crate::config`] decides match
//! priority when two bindings are configured identically.

use serde::{Deserialize, Serialize};

/// Player commands that can be bound to a global shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Toggle mute, remembering the volume to restore
    Mute,

    /// Lower the volume by the configured decrement
    VolumeDown,

    /// Raise the volume by the configured increment
    VolumeUp,

    /// Start playback
    Play,

    /// Pause playback (acts as play when stopped)
    Pause,

    /// Stop playback
    Stop,

    /// Jump to the previous playlist entry
    PrevTrack,

    /// Jump to the next playlist entry
    NextTrack,

    /// Open the player's jump-to-file chooser
    JumpToFile,

    /// Toggle visibility of the player windows
    ToggleWindows,

    /// Seek forward 5 seconds
    Forward,

    /// Seek backward 5 seconds
    Backward,

    /// Trigger the player's on-screen display
    ShowOsd,
}

impl Action {
    /// Key under which this action's binding is stored in the config file
    pub fn config_key(self) -> &'static str {
        match self {
            Action::Mute => "mute",
            Action::VolumeDown => "volume_down",
            Action::VolumeUp => "volume_up",
            Action::Play => "play",
            Action::Pause => "pause",
            Action::Stop => "stop",
            Action::PrevTrack => "prev_track",
            Action::NextTrack => "next_track",
            Action::JumpToFile => "jump_to_file",
            Action::ToggleWindows => "toggle_windows",
            Action::Forward => "forward",
            Action::Backward => "backward",
            Action::ShowOsd => "show_osd",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.config_key())
    }
}
