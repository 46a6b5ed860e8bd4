use serde::Deserialize;

/// Wire method names, matching the original channel contract
pub mod method {
    pub const PREPARE_PLAYER: &str = "preparePlayer";
    pub const START_PLAYER: &str = "startPlayer";
    pub const PAUSE_PLAYER: &str = "pausePlayer";
    pub const STOP_PLAYER: &str = "stopPlayer";
    pub const RELEASE_PLAYER: &str = "releasePlayer";
    pub const SEEK_TO: &str = "seekTo";
    pub const SET_VOLUME: &str = "setVolume";
    pub const SET_RATE: &str = "setRate";
    pub const SET_FINISH_MODE: &str = "setFinishMode";
    pub const GET_DURATION: &str = "getDuration";
    pub const START_RECORDING: &str = "startRecording";
    pub const STOP_RECORDING: &str = "stopRecording";
    pub const PAUSE_RECORDING: &str = "pauseRecording";
    pub const RESUME_RECORDING: &str = "resumeRecording";
    pub const GET_DECIBEL: &str = "getDecibel";
    pub const CHECK_PERMISSION: &str = "checkPermission";
    pub const CHECK_SPEECH_PERMISSION: &str = "checkSpeechPermission";
}

// ============================================================================
// Call argument types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PreparePlayerArgs {
    /// Session key; generated when the caller does not supply one
    #[serde(rename = "playerKey")]
    pub player_key: Option<String>,

    pub path: Option<String>,

    pub volume: Option<f64>,

    /// Position report interval in milliseconds
    #[serde(rename = "updateFrequency")]
    pub update_frequency: Option<u64>,

    #[serde(rename = "overrideAudioSession", default = "default_true")]
    pub override_audio_session: bool,

    /// 1 = earpiece, anything else = speaker
    #[serde(rename = "audioOutput")]
    pub audio_output: Option<i32>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct PlayerArgs {
    #[serde(rename = "playerKey")]
    pub player_key: String,
}

#[derive(Debug, Deserialize)]
pub struct SeekArgs {
    #[serde(rename = "playerKey")]
    pub player_key: String,

    pub progress: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeArgs {
    #[serde(rename = "playerKey")]
    pub player_key: String,

    pub volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RateArgs {
    #[serde(rename = "playerKey")]
    pub player_key: String,

    pub rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FinishModeArgs {
    #[serde(rename = "playerKey")]
    pub player_key: String,

    /// 0 = loop, 1 = pause at end, anything else = stop at end
    #[serde(rename = "finishMode")]
    pub finish_mode: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct DurationArgs {
    #[serde(rename = "playerKey")]
    pub player_key: String,

    /// 0 = current position, anything else = total duration
    #[serde(rename = "durationType")]
    pub duration_type: Option<i32>,
}
