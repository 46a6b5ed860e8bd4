//! Deviceless engines
//!
//! Clock-driven playback, a tone generator capture source, and a scripted
//! speech recognizer. These run headless (CI, tests, machines without
//! audio hardware) while exercising the exact session lifecycles the
//! device-backed engines do.

use std::f32::consts::TAU;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::capture::{AudioFrame, CaptureBackend, CaptureSpec};
use super::playback::{PlaybackEngine, PlaybackHandle};
use super::speech::{RecognitionUpdate, SpeechEngine, SpeechStream};

/// Playback engine that probes real media files but advances position by
/// the wall clock instead of a device stream.
#[derive(Default)]
pub struct ClockPlayback {
    live_handles: Arc<AtomicUsize>,
}

impl ClockPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of decode handles currently alive, across all sessions
    /// using this engine
    pub fn live_handles(&self) -> usize {
        self.live_handles.load(Ordering::SeqCst)
    }
}

impl PlaybackEngine for ClockPlayback {
    fn open(&self, path: &Path) -> Result<Box<dyn PlaybackHandle>> {
        let duration = crate::media::probe_duration(path)?;
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ClockHandle {
            duration,
            rate: 1.0,
            volume: 1.0,
            playing: false,
            base: Duration::ZERO,
            started: None,
            live: Arc::clone(&self.live_handles),
        }))
    }

    fn name(&self) -> &str {
        "clock"
    }
}

struct ClockHandle {
    duration: Duration,
    rate: f32,
    #[allow(dead_code)]
    volume: f32,
    playing: bool,
    /// Position when playback last started or was repositioned
    base: Duration,
    started: Option<Instant>,
    live: Arc<AtomicUsize>,
}

impl ClockHandle {
    fn current(&self) -> Duration {
        let pos = match self.started {
            Some(at) if self.playing => self.base + at.elapsed().mul_f32(self.rate),
            _ => self.base,
        };
        pos.min(self.duration)
    }

    /// Fold elapsed time into `base` so rate changes take effect from now
    fn rebase(&mut self) {
        self.base = self.current();
        self.started = self.playing.then(Instant::now);
    }
}

impl PlaybackHandle for ClockHandle {
    fn play(&mut self) -> Result<()> {
        if !self.playing {
            self.playing = true;
            self.started = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.base = self.current();
        self.playing = false;
        self.started = None;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.started = None;
        self.base = Duration::ZERO;
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.base = position.min(self.duration);
        self.started = self.playing.then(Instant::now);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_rate(&mut self, rate: f32) {
        self.rebase();
        self.rate = rate;
    }

    fn position(&self) -> Duration {
        self.current()
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.playing && self.current() >= self.duration
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handle onto a tone backend's emitted-frame count
#[derive(Clone)]
pub struct FrameCounter(Arc<AtomicUsize>);

impl FrameCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Capture source that synthesizes a sine tone on an interval.
///
/// Emits frames in a configurable "device" format so the recorder's
/// rate/mono conversion is exercised the same way it is with hardware.
pub struct ToneBackend {
    freq: f32,
    amplitude: f32,
    device_sample_rate: u32,
    device_channels: u16,
    enabled: Arc<AtomicBool>,
    frames_emitted: Arc<AtomicUsize>,
    task: Option<JoinHandle<()>>,
}

impl ToneBackend {
    pub fn new(freq: f32, amplitude: f32) -> Self {
        Self {
            freq,
            amplitude,
            device_sample_rate: 48000,
            device_channels: 1,
            enabled: Arc::new(AtomicBool::new(true)),
            frames_emitted: Arc::new(AtomicUsize::new(0)),
            task: None,
        }
    }

    /// Override the simulated device format (defaults to 48kHz mono)
    pub fn with_device_format(mut self, sample_rate: u32, channels: u16) -> Self {
        self.device_sample_rate = sample_rate;
        self.device_channels = channels;
        self
    }

    /// Shared view of the emitted-frame count, still readable after the
    /// backend has been handed to a session; pauses freeze it
    pub fn frame_counter(&self) -> FrameCounter {
        FrameCounter(Arc::clone(&self.frames_emitted))
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ToneBackend {
    async fn start(&mut self, spec: &CaptureSpec) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.task.is_some() {
            bail!("already capturing");
        }

        let (tx, rx) = mpsc::channel(32);
        let enabled = Arc::clone(&self.enabled);
        let emitted = Arc::clone(&self.frames_emitted);
        let sample_rate = self.device_sample_rate;
        let channels = self.device_channels;
        let samples_per_buffer =
            (sample_rate as u64 * spec.buffer_duration_ms / 1000) as usize;
        let freq = self.freq;
        let amplitude = self.amplitude;
        let interval = Duration::from_millis(spec.buffer_duration_ms);

        enabled.store(true, Ordering::SeqCst);

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut sample_clock: u64 = 0;

            loop {
                ticker.tick().await;
                if !enabled.load(Ordering::SeqCst) {
                    continue;
                }

                let mut samples = Vec::with_capacity(samples_per_buffer * channels as usize);
                for i in 0..samples_per_buffer {
                    let t = (sample_clock + i as u64) as f32 / sample_rate as f32;
                    let value = (amplitude * (TAU * freq * t).sin() * i16::MAX as f32) as i16;
                    for _ in 0..channels {
                        samples.push(value);
                    }
                }

                let frame = AudioFrame {
                    samples,
                    sample_rate,
                    channels,
                    timestamp_ms: sample_clock * 1000 / sample_rate as u64,
                };
                sample_clock += samples_per_buffer as u64;

                if tx.send(frame).await.is_err() {
                    break;
                }
                emitted.fetch_add(1, Ordering::SeqCst);
            }
        }));

        Ok(rx)
    }

    fn pause(&mut self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    fn resume(&mut self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.task.is_some()
    }

    fn name(&self) -> &str {
        "tone"
    }
}

/// Speech engine that replays a scripted sequence of hypotheses, one per
/// fed buffer. An empty script behaves as a null recognizer.
pub struct ScriptedSpeech {
    script: Vec<RecognitionUpdate>,
    authorized: bool,
}

impl ScriptedSpeech {
    pub fn new(script: Vec<RecognitionUpdate>) -> Self {
        Self {
            script,
            authorized: true,
        }
    }

    /// Engine whose authorization has been refused
    pub fn unauthorized() -> Self {
        Self {
            script: Vec::new(),
            authorized: false,
        }
    }
}

#[async_trait::async_trait]
impl SpeechEngine for ScriptedSpeech {
    async fn start_stream(&self) -> Result<SpeechStream> {
        let (feed_tx, mut feed_rx) = mpsc::channel::<AudioFrame>(32);
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let script = self.script.clone();

        tokio::spawn(async move {
            let mut next = 0usize;
            let mut last_sent: Option<RecognitionUpdate> = None;

            while let Some(_frame) = feed_rx.recv().await {
                if next >= script.len() {
                    continue;
                }
                let update = script[next].clone();
                next += 1;
                let ends = update.is_final;
                last_sent = Some(update.clone());
                if result_tx.send(update).is_err() || ends {
                    return;
                }
            }

            // Feed closed: finalize whatever partial hypothesis exists.
            if let Some(mut update) = last_sent {
                update.is_final = true;
                let _ = result_tx.send(update);
            }
            info!("scripted speech stream finalized");
        });

        Ok(SpeechStream {
            feed: feed_tx,
            results: result_rx,
        })
    }

    fn is_authorized(&self) -> bool {
        self.authorized
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
