use serde::{Deserialize, Serialize};

use crate::recorder::TranscriptUpdate;

/// Position report emitted while a player is active
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentDurationEvent {
    /// Current playback position in milliseconds
    pub current: u64,

    #[serde(rename = "playerKey")]
    pub player_key: String,
}

/// Emitted exactly once per natural end of media
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishEvent {
    /// 0 = loop, 1 = pause at end, 2 = stop at end
    #[serde(rename = "finishType")]
    pub finish_type: i32,

    #[serde(rename = "playerKey")]
    pub player_key: String,
}

/// An unsolicited event pushed to the host channel
#[derive(Debug, Clone)]
pub enum SessionEvent {
    CurrentDuration(CurrentDurationEvent),
    DidFinishPlaying(FinishEvent),
    TranscriptUpdate(TranscriptUpdate),
}

impl SessionEvent {
    /// Wire method name the host dispatches on
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::CurrentDuration(_) => "onCurrentDuration",
            SessionEvent::DidFinishPlaying(_) => "onDidFinishPlayingAudio",
            SessionEvent::TranscriptUpdate(_) => "onTranscriptUpdate",
        }
    }

    /// Serialized argument payload for the wire call
    pub fn args(&self) -> serde_json::Value {
        match self {
            SessionEvent::CurrentDuration(e) => serde_json::to_value(e),
            SessionEvent::DidFinishPlaying(e) => serde_json::to_value(e),
            SessionEvent::TranscriptUpdate(e) => serde_json::to_value(e),
        }
        .expect("event payloads serialize infallibly")
    }
}
