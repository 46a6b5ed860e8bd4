use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::info;

use super::calls::{
    method, DurationArgs, FinishModeArgs, PlayerArgs, PreparePlayerArgs, RateArgs, SeekArgs,
    VolumeArgs,
};
use crate::engine::{
    AudioRouteConfig, CaptureBackend, DurationKind, PlaybackEngine, SpeechEngine,
};
use crate::error::{BridgeError, Result};
use crate::events::{EventBus, SessionEvent};
use crate::player::PlayerSession;
use crate::recorder::{RecorderSession, RecordingSettings};

/// The method-channel surface: named calls in, values or tagged failures
/// out, unsolicited events on the side.
///
/// Player sessions are keyed and created on first `preparePlayer`; the
/// single recorder session is created up front. The transport that
/// carries calls and events is the host's concern.
pub struct Bridge {
    events: EventBus,
    playback_engine: Arc<dyn PlaybackEngine>,
    route: Arc<AudioRouteConfig>,
    players: HashMap<String, PlayerSession>,
    recorder: RecorderSession,
    /// Position-report interval for players whose prepare call gives none
    poll_interval: Duration,
}

impl Bridge {
    pub fn new(
        playback_engine: Arc<dyn PlaybackEngine>,
        capture_backend: Box<dyn CaptureBackend>,
        speech: Option<Arc<dyn SpeechEngine>>,
        recordings_dir: PathBuf,
    ) -> Self {
        let events = EventBus::default();
        let route = Arc::new(AudioRouteConfig::new());
        let recorder = RecorderSession::new(
            events.clone(),
            capture_backend,
            speech,
            Arc::clone(&route),
            recordings_dir,
        );

        Self {
            events,
            playback_engine,
            route,
            players: HashMap::new(),
            recorder,
            poll_interval: Duration::from_millis(200),
        }
    }

    /// Override the fallback position-report interval (service config)
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Subscribe to the unsolicited event stream
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Handle one named call with a key/value argument payload
    pub async fn dispatch(&mut self, method_name: &str, args: Value) -> Result<Value> {
        match method_name {
            method::PREPARE_PLAYER => {
                let args: PreparePlayerArgs = serde_json::from_value(args)?;
                let key = args
                    .player_key
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                let session = self.player_entry(key);
                session.prepare(
                    args.path.as_deref().unwrap_or(""),
                    args.volume,
                    args.update_frequency,
                    args.override_audio_session,
                    args.audio_output,
                )?;
                Ok(json!(true))
            }

            method::START_PLAYER => {
                let args: PlayerArgs = serde_json::from_value(args)?;
                let session = self
                    .players
                    .get_mut(&args.player_key)
                    .ok_or(BridgeError::NotPrepared)?;
                session.start()?;
                Ok(json!(true))
            }

            method::PAUSE_PLAYER => {
                let args: PlayerArgs = serde_json::from_value(args)?;
                if let Some(session) = self.players.get_mut(&args.player_key) {
                    session.pause();
                }
                Ok(json!(true))
            }

            method::STOP_PLAYER => {
                let args: PlayerArgs = serde_json::from_value(args)?;
                if let Some(session) = self.players.get_mut(&args.player_key) {
                    session.stop();
                }
                Ok(json!(true))
            }

            method::RELEASE_PLAYER => {
                let args: PlayerArgs = serde_json::from_value(args)?;
                if let Some(session) = self.players.get_mut(&args.player_key) {
                    session.release();
                }
                Ok(json!(true))
            }

            method::SEEK_TO => {
                let args: SeekArgs = serde_json::from_value(args)?;
                let moved = self
                    .players
                    .get_mut(&args.player_key)
                    .map(|session| session.seek(args.progress))
                    .unwrap_or(false);
                Ok(json!(moved))
            }

            method::SET_VOLUME => {
                let args: VolumeArgs = serde_json::from_value(args)?;
                if let Some(session) = self.players.get_mut(&args.player_key) {
                    session.set_volume(args.volume);
                }
                Ok(json!(true))
            }

            method::SET_RATE => {
                let args: RateArgs = serde_json::from_value(args)?;
                if let Some(session) = self.players.get_mut(&args.player_key) {
                    session.set_rate(args.rate);
                }
                Ok(json!(true))
            }

            method::SET_FINISH_MODE => {
                let args: FinishModeArgs = serde_json::from_value(args)?;
                if let Some(session) = self.players.get_mut(&args.player_key) {
                    session.set_finish_mode(args.finish_mode);
                }
                Ok(Value::Null)
            }

            method::GET_DURATION => {
                let args: DurationArgs = serde_json::from_value(args)?;
                let kind = match args.duration_type {
                    Some(0) => DurationKind::Current,
                    _ => DurationKind::Total,
                };
                let ms = self
                    .players
                    .get(&args.player_key)
                    .map(|session| session.duration(kind))
                    .unwrap_or(0);
                Ok(json!(ms))
            }

            method::START_RECORDING => {
                let settings = RecordingSettings::from_options(args)?;
                self.recorder.start(settings).await?;
                Ok(json!(true))
            }

            method::STOP_RECORDING => {
                let result = self.recorder.stop().await?;
                Ok(serde_json::to_value(result)?)
            }

            method::PAUSE_RECORDING => {
                self.recorder.pause()?;
                Ok(json!(true))
            }

            method::RESUME_RECORDING => {
                self.recorder.resume()?;
                Ok(json!(true))
            }

            method::GET_DECIBEL => Ok(json!(self.recorder.amplitude())),

            method::CHECK_PERMISSION => Ok(json!(self.recorder.has_permission())),

            method::CHECK_SPEECH_PERMISSION => {
                Ok(json!(self.recorder.has_speech_permission()))
            }

            unknown => Err(BridgeError::UnknownMethod(unknown.to_string())),
        }
    }

    fn player_entry(&mut self, key: String) -> &mut PlayerSession {
        let events = self.events.clone();
        let engine = Arc::clone(&self.playback_engine);
        let route = Arc::clone(&self.route);
        let poll = self.poll_interval;
        self.players.entry(key.clone()).or_insert_with(|| {
            info!("creating player session: {}", key);
            PlayerSession::new(key, events, engine, route).with_default_poll(poll)
        })
    }
}
