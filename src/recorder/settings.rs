use serde::{Deserialize, Serialize};

/// Caller-facing encoder identifiers.
///
/// Unrecognized ids fall back to AAC-LC rather than failing, so options
/// written against a newer caller version still record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioEncoder {
    AacLc,
    AacEld,
    AacHe,
    AacHeV2,
    Amr,
    AmrWb,
    Opus,
    LinearPcm,
    Alac,
    MpegLayer1,
    MpegLayer2,
    MpegLayer3,
}

impl AudioEncoder {
    pub fn from_id(id: i32) -> Self {
        match id {
            0 => AudioEncoder::AacLc,
            1 => AudioEncoder::MpegLayer1,
            2 => AudioEncoder::MpegLayer2,
            3 => AudioEncoder::MpegLayer3,
            4 => AudioEncoder::AacEld,
            5 => AudioEncoder::AacHe,
            6 => AudioEncoder::Opus,
            7 => AudioEncoder::Amr,
            8 => AudioEncoder::AmrWb,
            9 => AudioEncoder::LinearPcm,
            10 => AudioEncoder::Alac,
            11 => AudioEncoder::AacHeV2,
            _ => AudioEncoder::AacLc,
        }
    }

    /// Extension used when the output path is generated
    pub fn extension(self) -> &'static str {
        match self {
            AudioEncoder::AacLc
            | AudioEncoder::AacEld
            | AudioEncoder::AacHe
            | AudioEncoder::AacHeV2
            | AudioEncoder::Alac => "m4a",
            AudioEncoder::Amr => "amr",
            AudioEncoder::AmrWb => "awb",
            AudioEncoder::Opus => "opus",
            AudioEncoder::LinearPcm => "wav",
            AudioEncoder::MpegLayer1 | AudioEncoder::MpegLayer2 | AudioEncoder::MpegLayer3 => {
                "mp3"
            }
        }
    }
}

/// Immutable configuration snapshot for one recording, parsed from the
/// caller's key/value options with documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingSettings {
    /// Output path; a timestamped filename is generated when absent
    pub path: Option<String>,

    /// Caller-facing encoder id; unknown ids fall back to AAC-LC
    pub encoder: i32,

    #[serde(rename = "sampleRate")]
    pub sample_rate: u32,

    #[serde(rename = "bitRate")]
    pub bit_rate: Option<u32>,

    /// chrono strftime pattern for generated filenames
    #[serde(rename = "fileNameFormat")]
    pub file_name_format: String,

    /// Legacy amplitude reporting: smoothed average power in dB rather
    /// than linear peak amplitude
    #[serde(rename = "useLegacyNormalization")]
    pub use_legacy_normalization: bool,

    /// Whether to reconfigure the shared audio route at start
    #[serde(rename = "overrideAudioSession")]
    pub override_audio_session: bool,

    #[serde(rename = "linearPCMBitDepth")]
    pub linear_pcm_bit_depth: u16,

    #[serde(rename = "linearPCMIsBigEndian")]
    pub linear_pcm_is_big_endian: bool,

    #[serde(rename = "linearPCMIsFloat")]
    pub linear_pcm_is_float: bool,

    #[serde(rename = "enableSpeechToText")]
    pub enable_speech_to_text: bool,

    #[serde(rename = "enableVoiceProcessing")]
    pub enable_voice_processing: bool,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            path: None,
            encoder: 0,
            sample_rate: 44100,
            bit_rate: None,
            file_name_format: "%Y%m%d_%H%M%S".to_string(),
            use_legacy_normalization: false,
            override_audio_session: true,
            linear_pcm_bit_depth: 16,
            linear_pcm_is_big_endian: false,
            linear_pcm_is_float: false,
            enable_speech_to_text: false,
            enable_voice_processing: false,
        }
    }
}

impl RecordingSettings {
    /// Parse caller-supplied options; missing keys take defaults
    pub fn from_options(options: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(options)
    }

    pub fn encoder(&self) -> AudioEncoder {
        AudioEncoder::from_id(self.encoder)
    }
}
