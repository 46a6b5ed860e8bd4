// Tests for caller-facing option parsing and wire payload shapes

use anyhow::Result;
use serde_json::json;
use wavebridge::{
    AudioEncoder, Config, CurrentDurationEvent, FinishEvent, RecordingSettings, SessionEvent,
    TranscriptUpdate, TranscriptWord,
};

#[test]
fn test_settings_defaults_from_empty_options() -> Result<()> {
    let settings = RecordingSettings::from_options(json!({}))?;

    assert_eq!(settings.path, None);
    assert_eq!(settings.encoder, 0);
    assert_eq!(settings.sample_rate, 44100);
    assert_eq!(settings.bit_rate, None);
    assert_eq!(settings.file_name_format, "%Y%m%d_%H%M%S");
    assert!(!settings.use_legacy_normalization);
    assert!(settings.override_audio_session);
    assert_eq!(settings.linear_pcm_bit_depth, 16);
    assert!(!settings.linear_pcm_is_big_endian);
    assert!(!settings.linear_pcm_is_float);
    assert!(!settings.enable_speech_to_text);
    assert!(!settings.enable_voice_processing);
    Ok(())
}

#[test]
fn test_settings_parse_wire_keys() -> Result<()> {
    let settings = RecordingSettings::from_options(json!({
        "path": "/tmp/take.wav",
        "encoder": 9,
        "sampleRate": 16000,
        "bitRate": 128000,
        "fileNameFormat": "%s",
        "useLegacyNormalization": true,
        "overrideAudioSession": false,
        "linearPCMBitDepth": 24,
        "enableSpeechToText": true,
        "enableVoiceProcessing": true,
    }))?;

    assert_eq!(settings.path.as_deref(), Some("/tmp/take.wav"));
    assert_eq!(settings.encoder(), AudioEncoder::LinearPcm);
    assert_eq!(settings.sample_rate, 16000);
    assert_eq!(settings.bit_rate, Some(128000));
    assert_eq!(settings.file_name_format, "%s");
    assert!(settings.use_legacy_normalization);
    assert!(!settings.override_audio_session);
    assert_eq!(settings.linear_pcm_bit_depth, 24);
    assert!(settings.enable_speech_to_text);
    assert!(settings.enable_voice_processing);
    Ok(())
}

#[test]
fn test_encoder_id_mapping() {
    // Ids follow the caller enum's index order.
    assert_eq!(AudioEncoder::from_id(0), AudioEncoder::AacLc);
    assert_eq!(AudioEncoder::from_id(1), AudioEncoder::MpegLayer1);
    assert_eq!(AudioEncoder::from_id(2), AudioEncoder::MpegLayer2);
    assert_eq!(AudioEncoder::from_id(3), AudioEncoder::MpegLayer3);
    assert_eq!(AudioEncoder::from_id(4), AudioEncoder::AacEld);
    assert_eq!(AudioEncoder::from_id(5), AudioEncoder::AacHe);
    assert_eq!(AudioEncoder::from_id(6), AudioEncoder::Opus);
    assert_eq!(AudioEncoder::from_id(7), AudioEncoder::Amr);
    assert_eq!(AudioEncoder::from_id(8), AudioEncoder::AmrWb);
    assert_eq!(AudioEncoder::from_id(9), AudioEncoder::LinearPcm);
    assert_eq!(AudioEncoder::from_id(10), AudioEncoder::Alac);
    assert_eq!(AudioEncoder::from_id(11), AudioEncoder::AacHeV2);

    // Unknown ids record anyway rather than failing.
    assert_eq!(AudioEncoder::from_id(-1), AudioEncoder::AacLc);
    assert_eq!(AudioEncoder::from_id(42), AudioEncoder::AacLc);
}

#[test]
fn test_encoder_extensions() {
    assert_eq!(AudioEncoder::AacLc.extension(), "m4a");
    assert_eq!(AudioEncoder::Alac.extension(), "m4a");
    assert_eq!(AudioEncoder::Amr.extension(), "amr");
    assert_eq!(AudioEncoder::AmrWb.extension(), "awb");
    assert_eq!(AudioEncoder::Opus.extension(), "opus");
    assert_eq!(AudioEncoder::LinearPcm.extension(), "wav");
    assert_eq!(AudioEncoder::MpegLayer2.extension(), "mp3");
}

#[test]
fn test_event_wire_names_and_payload_keys() {
    let position = SessionEvent::CurrentDuration(CurrentDurationEvent {
        current: 1500,
        player_key: "p1".to_string(),
    });
    assert_eq!(position.name(), "onCurrentDuration");
    let args = position.args();
    assert_eq!(args["current"], 1500);
    assert_eq!(args["playerKey"], "p1");

    let finish = SessionEvent::DidFinishPlaying(FinishEvent {
        finish_type: 2,
        player_key: "p1".to_string(),
    });
    assert_eq!(finish.name(), "onDidFinishPlayingAudio");
    assert_eq!(finish.args()["finishType"], 2);

    let transcript = SessionEvent::TranscriptUpdate(TranscriptUpdate {
        full_text: "hello world".to_string(),
        words: vec![TranscriptWord {
            text: "hello".to_string(),
            start_ms: 0,
            end_ms: 420,
            confidence: 0.87,
        }],
    });
    assert_eq!(transcript.name(), "onTranscriptUpdate");
    let args = transcript.args();
    assert_eq!(args["full_text"], "hello world");
    assert_eq!(args["words"][0]["word"], "hello");
    assert_eq!(args["words"][0]["start"], 0);
    assert_eq!(args["words"][0]["end"], 420);
}

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.service.name, "wavebridge");
    assert_eq!(config.audio.recordings_path, "recordings");
    assert_eq!(config.audio.poll_interval_ms, 200);
}

#[test]
fn test_config_load_overrides_defaults() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let path = temp.path().join("wavebridge.toml");
    std::fs::write(&path, "[audio]\npoll_interval_ms = 50\n")?;

    let stem = temp.path().join("wavebridge");
    let config = Config::load(stem.to_str().unwrap())?;

    assert_eq!(config.audio.poll_interval_ms, 50);
    assert_eq!(config.audio.recordings_path, "recordings");
    assert_eq!(config.service.name, "wavebridge");
    Ok(())
}

#[test]
fn test_config_load_missing_file_fails() {
    assert!(Config::load("/nonexistent/wavebridge").is_err());
}
