// Integration tests for method-call dispatch
//
// These drive the full bridge surface the way a host channel would: named
// calls with JSON argument payloads, values or tagged failures back.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::{json, Value};
use tempfile::TempDir;
use wavebridge::bridge::method;
use wavebridge::{Bridge, BridgeError, ClockPlayback, SessionEvent, ToneBackend};

fn write_wav(dir: &Path, name: &str, millis: u64) -> Result<PathBuf> {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec)?;
    for i in 0..(8000 * millis / 1000) {
        let t = i as f32 / 8000.0;
        let value = (0.3 * (std::f32::consts::TAU * 440.0 * t).sin() * i16::MAX as f32) as i16;
        writer.write_sample(value)?;
    }
    writer.finalize()?;
    Ok(path)
}

fn new_bridge(temp: &TempDir) -> Bridge {
    Bridge::new(
        Arc::new(ClockPlayback::new()),
        Box::new(ToneBackend::new(440.0, 0.5).with_device_format(44100, 1)),
        None,
        temp.path().to_path_buf(),
    )
}

#[tokio::test]
async fn test_player_call_lifecycle() -> Result<()> {
    let temp = TempDir::new()?;
    let clip = write_wav(temp.path(), "clip.wav", 2000)?;
    let mut bridge = new_bridge(&temp);

    let ok = bridge
        .dispatch(
            method::PREPARE_PLAYER,
            json!({ "playerKey": "p1", "path": clip.display().to_string() }),
        )
        .await?;
    assert_eq!(ok, json!(true));

    let total = bridge
        .dispatch(
            method::GET_DURATION,
            json!({ "playerKey": "p1", "durationType": 1 }),
        )
        .await?;
    assert!(total.as_u64().unwrap() > 1900);

    assert_eq!(
        bridge
            .dispatch(method::START_PLAYER, json!({ "playerKey": "p1" }))
            .await?,
        json!(true)
    );
    assert_eq!(
        bridge
            .dispatch(method::PAUSE_PLAYER, json!({ "playerKey": "p1" }))
            .await?,
        json!(true)
    );
    assert_eq!(
        bridge
            .dispatch(method::STOP_PLAYER, json!({ "playerKey": "p1" }))
            .await?,
        json!(true)
    );

    // Stopped players report position zero.
    let current = bridge
        .dispatch(
            method::GET_DURATION,
            json!({ "playerKey": "p1", "durationType": 0 }),
        )
        .await?;
    assert_eq!(current, json!(0));

    assert_eq!(
        bridge
            .dispatch(method::RELEASE_PLAYER, json!({ "playerKey": "p1" }))
            .await?,
        json!(true)
    );
    Ok(())
}

#[tokio::test]
async fn test_start_requires_prepare() -> Result<()> {
    let temp = TempDir::new()?;
    let mut bridge = new_bridge(&temp);

    let result = bridge
        .dispatch(method::START_PLAYER, json!({ "playerKey": "ghost" }))
        .await;
    assert!(matches!(result, Err(BridgeError::NotPrepared)));
    Ok(())
}

#[tokio::test]
async fn test_calls_on_unknown_player_are_tolerated() -> Result<()> {
    let temp = TempDir::new()?;
    let mut bridge = new_bridge(&temp);
    let args = json!({ "playerKey": "ghost" });

    assert_eq!(
        bridge.dispatch(method::PAUSE_PLAYER, args.clone()).await?,
        json!(true)
    );
    assert_eq!(
        bridge.dispatch(method::STOP_PLAYER, args.clone()).await?,
        json!(true)
    );
    assert_eq!(
        bridge.dispatch(method::RELEASE_PLAYER, args.clone()).await?,
        json!(true)
    );
    assert_eq!(
        bridge
            .dispatch(method::SET_VOLUME, json!({ "playerKey": "ghost", "volume": 0.5 }))
            .await?,
        json!(true)
    );
    assert_eq!(
        bridge
            .dispatch(method::SEEK_TO, json!({ "playerKey": "ghost", "progress": 100 }))
            .await?,
        json!(false)
    );
    assert_eq!(
        bridge
            .dispatch(method::SET_FINISH_MODE, json!({ "playerKey": "ghost", "finishMode": 0 }))
            .await?,
        Value::Null
    );
    assert_eq!(
        bridge
            .dispatch(method::GET_DURATION, json!({ "playerKey": "ghost" }))
            .await?,
        json!(0)
    );
    Ok(())
}

#[tokio::test]
async fn test_unknown_method_is_rejected() -> Result<()> {
    let temp = TempDir::new()?;
    let mut bridge = new_bridge(&temp);

    let result = bridge.dispatch("transcode", json!({})).await;
    match result {
        Err(BridgeError::UnknownMethod(name)) => assert_eq!(name, "transcode"),
        other => panic!("expected unknown-method failure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_malformed_arguments_are_rejected() -> Result<()> {
    let temp = TempDir::new()?;
    let mut bridge = new_bridge(&temp);

    let result = bridge.dispatch(method::START_PLAYER, json!({})).await;
    assert!(matches!(result, Err(BridgeError::BadArguments(_))));

    let result = bridge
        .dispatch(method::SEEK_TO, json!({ "playerKey": 7 }))
        .await;
    assert!(matches!(result, Err(BridgeError::BadArguments(_))));
    Ok(())
}

#[tokio::test]
async fn test_seek_emits_position_event() -> Result<()> {
    let temp = TempDir::new()?;
    let clip = write_wav(temp.path(), "clip.wav", 2000)?;
    let mut bridge = new_bridge(&temp);
    let mut rx = bridge.subscribe();

    bridge
        .dispatch(
            method::PREPARE_PLAYER,
            json!({ "playerKey": "p1", "path": clip.display().to_string() }),
        )
        .await?;
    let moved = bridge
        .dispatch(method::SEEK_TO, json!({ "playerKey": "p1", "progress": 750 }))
        .await?;
    assert_eq!(moved, json!(true));

    let event = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await??;
    match event {
        SessionEvent::CurrentDuration(e) => {
            assert_eq!(e.current, 750);
            assert_eq!(e.player_key, "p1");
        }
        other => panic!("expected position report, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_recording_call_lifecycle() -> Result<()> {
    let temp = TempDir::new()?;
    let mut bridge = new_bridge(&temp);

    assert_eq!(
        bridge.dispatch(method::CHECK_PERMISSION, json!({})).await?,
        json!(true)
    );
    // No speech engine configured.
    assert_eq!(
        bridge
            .dispatch(method::CHECK_SPEECH_PERMISSION, json!({}))
            .await?,
        json!(false)
    );

    let out = temp.path().join("take.wav").display().to_string();
    assert_eq!(
        bridge
            .dispatch(method::START_RECORDING, json!({ "path": out, "encoder": 9 }))
            .await?,
        json!(true)
    );

    assert_eq!(
        bridge.dispatch(method::PAUSE_RECORDING, json!({})).await?,
        json!(true)
    );
    assert_eq!(
        bridge.dispatch(method::RESUME_RECORDING, json!({})).await?,
        json!(true)
    );

    tokio::time::sleep(Duration::from_millis(300)).await;
    let level = bridge.dispatch(method::GET_DECIBEL, json!({})).await?;
    assert!(level.is_number());

    let result = bridge.dispatch(method::STOP_RECORDING, json!({})).await?;
    assert!(result["path"].as_str().unwrap().ends_with("take.wav"));
    assert!(result["duration"].as_u64().unwrap() > 0);
    assert!(result.get("transcript").is_none());

    let stopped = bridge.dispatch(method::PAUSE_RECORDING, json!({})).await;
    assert!(matches!(stopped, Err(BridgeError::NotRecording)));
    Ok(())
}
