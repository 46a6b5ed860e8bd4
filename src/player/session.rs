use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::engine::{
    AudioRoute, AudioRouteConfig, DurationKind, FinishMode, PlaybackEngine, PlaybackHandle,
    RouteUsage,
};
use crate::error::{BridgeError, Result};
use crate::events::{CurrentDurationEvent, EventBus, FinishEvent, SessionEvent};
use crate::media;

const DEFAULT_POLL_MS: u64 = 200;

/// Explicit lifecycle state; checked before every operation instead of
/// relying on an implicit nullable handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Prepared,
    Playing,
    Paused,
}

struct PlayerShared {
    handle: Mutex<Option<Box<dyn PlaybackHandle>>>,
    state: Mutex<PlayerState>,
    /// Encoded as the finish-type code (0 loop, 1 pause, 2 stop)
    finish_mode: AtomicI32,
    ticking: AtomicBool,
}

/// A playback session owning zero-or-one decode handle.
///
/// Position reports run on a cancellable ticker task; the ticker also
/// observes natural end of media and applies the finish mode. Every exit
/// path (pause, stop, release, re-prepare) cancels the ticker before the
/// session leaves an active state.
pub struct PlayerSession {
    key: String,
    events: EventBus,
    engine: Arc<dyn PlaybackEngine>,
    route: Arc<AudioRouteConfig>,
    shared: Arc<PlayerShared>,
    /// Position-report interval used when the caller gives none
    default_poll: Duration,
    poll_interval: Duration,
    /// Routing recorded at prepare, applied just-in-time at start
    pending_route: Option<AudioRoute>,
    ticker: Option<JoinHandle<()>>,
}

impl PlayerSession {
    pub fn new(
        key: String,
        events: EventBus,
        engine: Arc<dyn PlaybackEngine>,
        route: Arc<AudioRouteConfig>,
    ) -> Self {
        Self {
            key,
            events,
            engine,
            route,
            shared: Arc::new(PlayerShared {
                handle: Mutex::new(None),
                state: Mutex::new(PlayerState::Idle),
                finish_mode: AtomicI32::new(FinishMode::StopAtEnd.finish_type()),
                ticking: AtomicBool::new(false),
            }),
            default_poll: Duration::from_millis(DEFAULT_POLL_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            pending_route: None,
            ticker: None,
        }
    }

    /// Override the fallback position-report interval (service config)
    pub fn with_default_poll(mut self, interval: Duration) -> Self {
        self.default_poll = interval;
        self.poll_interval = interval;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> PlayerState {
        *self.shared.state.lock().expect("state lock poisoned")
    }

    /// Open a decode handle for `path`.
    ///
    /// Any prior handle is fully released first, strict
    /// release-before-acquire. Routing is recorded here but deliberately
    /// not applied until `start`, so many prepared sessions never
    /// contend for the shared audio path.
    pub fn prepare(
        &mut self,
        path: &str,
        volume: Option<f64>,
        update_frequency_ms: Option<u64>,
        override_audio_session: bool,
        audio_output: Option<i32>,
    ) -> Result<()> {
        let source = path.trim().trim_start_matches("file://");
        if source.is_empty() {
            return Err(BridgeError::InvalidSource(
                "audio file path can't be empty".into(),
            ));
        }
        if !Path::new(source).exists() {
            return Err(BridgeError::InvalidSource(source.to_string()));
        }

        // Tear the old handle down before the new one exists.
        self.cancel_ticker();
        self.set_handle(None, PlayerState::Idle);

        let mut handle = self
            .engine
            .open(Path::new(source))
            .map_err(|e| BridgeError::PrepareFailed(format!("{e:#}")))?;

        handle.set_volume(volume.unwrap_or(1.0) as f32);
        handle.set_rate(1.0);

        self.poll_interval = update_frequency_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_poll);
        self.pending_route =
            override_audio_session.then(|| AudioRoute::from_id(audio_output));
        self.set_handle(Some(handle), PlayerState::Prepared);

        info!("player {} prepared: {}", self.key, source);

        Ok(())
    }

    /// Begin playback and the periodic position ticker
    pub fn start(&mut self) -> Result<()> {
        {
            let mut guard = self.shared.handle.lock().expect("handle lock poisoned");
            let handle = guard.as_mut().ok_or(BridgeError::NotPrepared)?;

            // The shared route is only touched once the session is known
            // to be startable.
            if let Some(route) = self.pending_route {
                self.route.configure(route, RouteUsage::Playback, &self.key);
            }

            handle
                .play()
                .map_err(|e| BridgeError::StartFailed(format!("{e:#}")))?;
        }
        *self.shared.state.lock().expect("state lock poisoned") = PlayerState::Playing;

        self.spawn_ticker();

        Ok(())
    }

    /// Halt playback, cancel the ticker, emit one final position report;
    /// the decode handle is kept
    pub fn pause(&mut self) {
        self.cancel_ticker();
        self.emit_position();

        let mut guard = self.shared.handle.lock().expect("handle lock poisoned");
        if let Some(handle) = guard.as_mut() {
            handle.pause();
            *self.shared.state.lock().expect("state lock poisoned") = PlayerState::Paused;
        }
    }

    /// Halt playback, cancel the ticker, emit one final position report,
    /// and release the decode handle
    pub fn stop(&mut self) {
        self.cancel_ticker();
        self.emit_position();

        let mut guard = self.shared.handle.lock().expect("handle lock poisoned");
        if let Some(handle) = guard.as_mut() {
            handle.stop();
        }
        *guard = None;
        *self.shared.state.lock().expect("state lock poisoned") = PlayerState::Idle;
    }

    /// Drop the decode handle without emitting anything
    pub fn release(&mut self) {
        self.cancel_ticker();
        self.set_handle(None, PlayerState::Idle);
    }

    /// Reposition and emit exactly one immediate position report.
    ///
    /// Returns false, with no event, when no time is given or no handle
    /// is prepared.
    pub fn seek(&mut self, position_ms: Option<u64>) -> bool {
        let Some(ms) = position_ms else {
            return false;
        };

        let mut guard = self.shared.handle.lock().expect("handle lock poisoned");
        let Some(handle) = guard.as_mut() else {
            return false;
        };

        if let Err(e) = handle.seek(Duration::from_millis(ms)) {
            warn!("player {} seek failed: {e:#}", self.key);
            return false;
        }
        drop(guard);

        self.events.emit(SessionEvent::CurrentDuration(CurrentDurationEvent {
            current: ms,
            player_key: self.key.clone(),
        }));
        true
    }

    /// Silently tolerated no-op when no handle is prepared
    pub fn set_volume(&mut self, volume: Option<f64>) {
        let mut guard = self.shared.handle.lock().expect("handle lock poisoned");
        if let Some(handle) = guard.as_mut() {
            handle.set_volume(volume.unwrap_or(1.0) as f32);
        }
    }

    /// Silently tolerated no-op when no handle is prepared
    pub fn set_rate(&mut self, rate: Option<f64>) {
        let mut guard = self.shared.handle.lock().expect("handle lock poisoned");
        if let Some(handle) = guard.as_mut() {
            handle.set_rate(rate.unwrap_or(1.0) as f32);
        }
    }

    pub fn set_finish_mode(&mut self, mode_id: Option<i32>) {
        let mode = FinishMode::from_id(mode_id);
        self.shared
            .finish_mode
            .store(mode.finish_type(), Ordering::SeqCst);
    }

    /// Milliseconds derived from the handle's native time unit, rounding
    /// toward zero; 0 when no handle is prepared
    pub fn duration(&self, kind: DurationKind) -> u64 {
        let guard = self.shared.handle.lock().expect("handle lock poisoned");
        match guard.as_ref() {
            Some(handle) => match kind {
                DurationKind::Current => media::to_millis(handle.position()),
                DurationKind::Total => media::to_millis(handle.duration()),
            },
            None => 0,
        }
    }

    fn set_handle(&self, handle: Option<Box<dyn PlaybackHandle>>, state: PlayerState) {
        *self.shared.handle.lock().expect("handle lock poisoned") = handle;
        *self.shared.state.lock().expect("state lock poisoned") = state;
    }

    fn emit_position(&self) {
        let current = self.duration(DurationKind::Current);
        self.events.emit(SessionEvent::CurrentDuration(CurrentDurationEvent {
            current,
            player_key: self.key.clone(),
        }));
    }

    fn cancel_ticker(&mut self) {
        self.shared.ticking.store(false, Ordering::SeqCst);
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn spawn_ticker(&mut self) {
        self.cancel_ticker();
        self.shared.ticking.store(true, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let events = self.events.clone();
        let key = self.key.clone();
        let poll = self.poll_interval;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so reports
            // line up on the configured interval.
            interval.tick().await;

            loop {
                interval.tick().await;
                if !shared.ticking.load(Ordering::SeqCst) {
                    break;
                }

                let observed = {
                    let guard = shared.handle.lock().expect("handle lock poisoned");
                    guard
                        .as_ref()
                        .map(|h| (media::to_millis(h.position()), h.is_finished()))
                };
                let Some((position, finished)) = observed else {
                    break;
                };

                events.emit(SessionEvent::CurrentDuration(CurrentDurationEvent {
                    current: position,
                    player_key: key.clone(),
                }));

                if !finished {
                    continue;
                }

                // Natural end of media: apply the finish mode and emit
                // the finish event exactly once.
                let mode =
                    FinishMode::from_id(Some(shared.finish_mode.load(Ordering::SeqCst)));
                {
                    let mut guard = shared.handle.lock().expect("handle lock poisoned");
                    if let Some(handle) = guard.as_mut() {
                        match mode {
                            FinishMode::Loop => {
                                let _ = handle.seek(Duration::ZERO);
                                let _ = handle.play();
                            }
                            FinishMode::PauseAtEnd => handle.pause(),
                            FinishMode::StopAtEnd => handle.stop(),
                        }
                    }
                    if mode == FinishMode::StopAtEnd {
                        *guard = None;
                    }
                }

                match mode {
                    FinishMode::Loop => {}
                    FinishMode::PauseAtEnd => {
                        *shared.state.lock().expect("state lock poisoned") =
                            PlayerState::Paused;
                        shared.ticking.store(false, Ordering::SeqCst);
                    }
                    FinishMode::StopAtEnd => {
                        *shared.state.lock().expect("state lock poisoned") =
                            PlayerState::Idle;
                        shared.ticking.store(false, Ordering::SeqCst);
                    }
                }

                events.emit(SessionEvent::DidFinishPlaying(FinishEvent {
                    finish_type: mode.finish_type(),
                    player_key: key.clone(),
                }));

                if mode != FinishMode::Loop {
                    break;
                }
            }
        }));
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}
