use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::meter::Meter;
use super::settings::RecordingSettings;
use super::sink::WavSink;
use super::transcript::{Transcript, TranscriptUpdate};
use crate::engine::{
    AudioFrame, AudioRoute, AudioRouteConfig, CaptureBackend, CaptureSpec, RouteUsage,
    SpeechEngine,
};
use crate::error::{BridgeError, Result};
use crate::events::{EventBus, SessionEvent};

/// Payload returned by `stop`: where the media landed, how long it is,
/// and the final transcript when speech-to-text was active
#[derive(Debug, Clone, Serialize)]
pub struct RecordingResult {
    pub path: String,

    /// Recorded media duration in milliseconds, 0 if probing failed
    pub duration: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<TranscriptUpdate>,
}

struct ActiveRecording {
    settings: RecordingSettings,
    output_path: PathBuf,
    #[allow(dead_code)]
    started_at: DateTime<Utc>,
    paused: bool,
    speech_active: bool,
    meter: Arc<Meter>,
    transcript: Arc<Mutex<Transcript>>,
    fanout: JoinHandle<()>,
    speech_task: Option<JoinHandle<()>>,
}

/// A recording session owning zero-or-one capture handle plus an
/// optional speech-transcription sub-session.
///
/// Captured buffers fan out to two independent consumers, the encoder
/// sink and the transcription feed; the feed never backpressures the
/// sink. All state transitions happen on the control task; background
/// tasks only touch the meter, the transcript, and the event bus.
pub struct RecorderSession {
    events: EventBus,
    backend: Box<dyn CaptureBackend>,
    speech: Option<Arc<dyn SpeechEngine>>,
    route: Arc<AudioRouteConfig>,
    recordings_dir: PathBuf,
    active: Option<ActiveRecording>,
}

impl RecorderSession {
    pub fn new(
        events: EventBus,
        backend: Box<dyn CaptureBackend>,
        speech: Option<Arc<dyn SpeechEngine>>,
        route: Arc<AudioRouteConfig>,
        recordings_dir: PathBuf,
    ) -> Self {
        Self {
            events,
            backend,
            speech,
            route,
            recordings_dir,
            active: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.paused)
    }

    /// Microphone authorization, surfaced as the `checkPermission` call
    pub fn has_permission(&self) -> bool {
        self.backend.has_permission()
    }

    /// Speech authorization, surfaced as the `checkSpeechPermission` call
    pub fn has_speech_permission(&self) -> bool {
        self.speech.as_ref().is_some_and(|s| s.is_authorized())
    }

    /// Start capturing with an immutable settings snapshot.
    ///
    /// A live recording is fully stopped and released before the new
    /// capture handle is opened, never overlapping.
    pub async fn start(&mut self, settings: RecordingSettings) -> Result<()> {
        if self.active.is_some() {
            warn!("recording already active, stopping it before restart");
            let _ = self.stop().await?;
        }

        if !self.backend.has_permission() {
            return Err(BridgeError::PermissionDenied("microphone"));
        }

        let output_path = self.resolve_output_path(&settings)?;

        if settings.override_audio_session {
            self.route.configure(
                AudioRoute::Speaker,
                RouteUsage::PlayAndRecord {
                    voice_processing: settings.enable_voice_processing,
                },
                "recorder",
            );
        }

        let spec = CaptureSpec {
            sample_rate: settings.sample_rate,
            channels: 1,
            buffer_duration_ms: 100,
        };

        let mut frames = self
            .backend
            .start(&spec)
            .await
            .map_err(|e| BridgeError::StartFailed(format!("{e:#}")))?;

        let sink = match WavSink::create(&output_path, &settings) {
            Ok(sink) => sink,
            Err(e) => {
                let _ = self.backend.stop().await;
                return Err(BridgeError::StartFailed(format!("{e:#}")));
            }
        };

        // Open the transcription sub-stream if asked for. Failures here
        // degrade the transcript, never the recording.
        let mut speech_stream = None;
        if settings.enable_speech_to_text {
            match &self.speech {
                Some(engine) if engine.is_authorized() => {
                    match engine.start_stream().await {
                        Ok(stream) => speech_stream = Some(stream),
                        Err(e) => warn!("speech stream failed to start: {e:#}"),
                    }
                }
                Some(engine) => {
                    warn!("speech engine {} not authorized, transcript disabled", engine.name())
                }
                None => warn!("speech-to-text requested but no speech engine configured"),
            }
        }
        let speech_active = speech_stream.is_some();

        let meter = Arc::new(Meter::new());
        let transcript = Arc::new(Mutex::new(Transcript::default()));

        let (speech_feed, speech_results) = match speech_stream {
            Some(stream) => (Some(stream.feed), Some(stream.results)),
            None => (None, None),
        };

        // Fan-out: one frame source, two consumers. The sink write is
        // unconditional; the speech feed uses try_send so a stalled
        // recognizer only loses buffers.
        let fanout_meter = Arc::clone(&meter);
        let target_rate = settings.sample_rate;
        let mut sink = sink;
        let fanout = tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                let frame = process_frame(frame, target_rate);
                fanout_meter.update(&frame);
                if let Err(e) = sink.write_frame(&frame) {
                    error!("encoder sink write failed: {e:#}");
                    break;
                }
                if let Some(feed) = &speech_feed {
                    let _ = feed.try_send(frame);
                }
            }
            let written = sink.samples_written();
            match sink.finish() {
                Ok(path) => info!("captured {} samples to {}", written, path.display()),
                Err(e) => error!("failed to finalize recording: {e:#}"),
            }
        });

        let speech_task = speech_results.map(|mut results| {
            let transcript = Arc::clone(&transcript);
            let events = self.events.clone();
            tokio::spawn(async move {
                while let Some(update) = results.recv().await {
                    let is_final = update.is_final;
                    let snapshot = {
                        let mut t = transcript.lock().expect("transcript lock poisoned");
                        t.replace(update.text, update.words);
                        t.snapshot()
                    };
                    events.emit(SessionEvent::TranscriptUpdate(snapshot));
                    if is_final {
                        break;
                    }
                }
                info!("transcription sub-stream ended");
            })
        });

        info!(
            "recording started: {} ({}Hz, encoder {:?}, speech {})",
            output_path.display(),
            settings.sample_rate,
            settings.encoder(),
            speech_active
        );

        self.active = Some(ActiveRecording {
            settings,
            output_path,
            started_at: Utc::now(),
            paused: false,
            speech_active,
            meter,
            transcript,
            fanout,
            speech_task,
        });

        Ok(())
    }

    /// Suspend capture. With no frames flowing, the sink, the meter, and
    /// the transcription feed all idle together.
    pub fn pause(&mut self) -> Result<()> {
        let active = self.active.as_mut().ok_or(BridgeError::NotRecording)?;
        if !active.paused {
            self.backend.pause();
            active.paused = true;
            info!("recording paused");
        }
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        let active = self.active.as_mut().ok_or(BridgeError::NotRecording)?;
        if active.paused {
            self.backend.resume();
            active.paused = false;
            info!("recording resumed");
        }
        Ok(())
    }

    /// Current amplitude in the mode fixed at start; 0 when idle
    pub fn amplitude(&self) -> f64 {
        match &self.active {
            Some(active) => active
                .meter
                .amplitude(active.settings.use_legacy_normalization),
            None => 0.0,
        }
    }

    /// Stop capture, finalize the sink and transcript, and probe the
    /// written file's duration. Probe failure reports duration 0; the
    /// recording itself is still a success.
    pub async fn stop(&mut self) -> Result<RecordingResult> {
        let active = self.active.take().ok_or(BridgeError::NotRecording)?;

        if let Err(e) = self.backend.stop().await {
            error!("capture backend failed to stop: {e:#}");
        }

        // The frame channel is closed now; the fan-out drains what is
        // left, finalizes the sink, and drops the speech feed, which in
        // turn finalizes the transcript.
        if let Err(e) = active.fanout.await {
            error!("fan-out task panicked: {e}");
        }
        if let Some(task) = active.speech_task {
            if let Err(e) = task.await {
                error!("speech task panicked: {e}");
            }
        }

        let duration = match crate::media::probe_duration(&active.output_path) {
            Ok(d) => crate::media::to_millis(d),
            Err(e) => {
                warn!("duration probe failed: {e:#}");
                0
            }
        };

        let transcript = active.speech_active.then(|| {
            active
                .transcript
                .lock()
                .expect("transcript lock poisoned")
                .snapshot()
        });

        info!(
            "recording stopped: {} ({duration}ms)",
            active.output_path.display()
        );

        Ok(RecordingResult {
            path: active.output_path.display().to_string(),
            duration,
            transcript,
        })
    }

    fn resolve_output_path(&self, settings: &RecordingSettings) -> Result<PathBuf> {
        match &settings.path {
            Some(path) => {
                let path = PathBuf::from(path);
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.is_dir() {
                        return Err(BridgeError::DirectoryUnavailable(
                            parent.display().to_string(),
                        ));
                    }
                }
                Ok(path)
            }
            None => {
                if !self.recordings_dir.is_dir() {
                    return Err(BridgeError::DirectoryUnavailable(
                        self.recordings_dir.display().to_string(),
                    ));
                }
                let file_name = format!(
                    "{}.{}",
                    Local::now().format(&settings.file_name_format),
                    settings.encoder().extension()
                );
                Ok(self.recordings_dir.join(file_name))
            }
        }
    }
}

/// Convert a device-format frame to mono at the target rate before it
/// reaches the sink and the speech feed
fn process_frame(frame: AudioFrame, target_rate: u32) -> AudioFrame {
    let frame = to_mono(frame);
    downsample(frame, target_rate)
}

/// Downsample by decimation; upsampling is not attempted
fn downsample(frame: AudioFrame, target_rate: u32) -> AudioFrame {
    if frame.sample_rate <= target_rate {
        return frame;
    }
    let ratio = frame.sample_rate / target_rate;
    if ratio <= 1 {
        return frame;
    }
    let samples: Vec<i16> = frame.samples.iter().step_by(ratio as usize).copied().collect();
    AudioFrame {
        samples,
        sample_rate: target_rate,
        channels: frame.channels,
        timestamp_ms: frame.timestamp_ms,
    }
}

/// Mix interleaved channels down to mono by averaging
fn to_mono(frame: AudioFrame) -> AudioFrame {
    if frame.channels <= 1 {
        return frame;
    }
    let channels = frame.channels as usize;
    let mut samples = Vec::with_capacity(frame.samples.len() / channels);
    for group in frame.samples.chunks_exact(channels) {
        let sum: i32 = group.iter().map(|&s| s as i32).sum();
        samples.push((sum / channels as i32) as i16);
    }
    AudioFrame {
        samples,
        sample_rate: frame.sample_rate,
        channels: 1,
        timestamp_ms: frame.timestamp_ms,
    }
}
