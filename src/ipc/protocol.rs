//! Player control protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian
//! length. Every request gets exactly one reply.

use serde::{Deserialize, Serialize};

/// Requests from the daemon to the player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerRequest {
    /// Ask for the current playback status
    Status,

    /// Start playback
    Play,

    /// Pause playback
    Pause,

    /// Stop playback
    Stop,

    /// Previous playlist entry
    PrevTrack,

    /// Next playlist entry
    NextTrack,

    /// Set the main volume, percent
    SetVolume { level: u8 },

    /// Seek to an absolute position
    SeekTo { position_ms: u64 },

    /// Open the jump-to-file chooser
    JumpToFile,

    /// Toggle visibility of the player windows
    ToggleWindows,

    /// Trigger the on-screen display
    ShowOsd,

    /// Ping to check connectivity
    Ping,
}

/// Replies from the player to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerReply {
    /// Current playback status
    Status(PlayerStatus),

    /// Command accepted
    Ok,

    /// Pong response to ping
    Pong,

    /// Command rejected
    Error { code: String, message: String },
}

/// Playback status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatus {
    /// Whether playback is running
    pub playing: bool,

    /// Main volume, percent
    pub volume: u8,

    /// Playback position in the current track
    pub position_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = PlayerRequest::SetVolume { level: 42 };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("set_volume"));
        assert!(json.contains("42"));
    }

    #[test]
    fn test_reply_deserialization() {
        let json = r#"{"type":"status","playing":true,"volume":80,"position_ms":12000}"#;
        let reply: PlayerReply = serde_json::from_str(json).unwrap();
        match reply {
            PlayerReply::Status(status) => {
                assert!(status.playing);
                assert_eq!(status.volume, 80);
                assert_eq!(status.position_ms, 12000);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_error_reply_round_trip() {
        let reply = PlayerReply::Error {
            code: "busy".to_string(),
            message: "player is busy".to_string(),
        };
        let json = serde_json::to_string(&reply).unwrap();
        let parsed: PlayerReply = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, PlayerReply::Error { .. }));
    }
}
