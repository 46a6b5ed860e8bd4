//! cpal microphone capture backend
//!
//! The device stream is owned by a dedicated thread because cpal streams
//! are not `Send`. Pausing flips an atomic enable flag checked inside the
//! device callback; overflow frames are silently dropped rather than
//! blocking the callback.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread;

use anyhow::{bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use tokio::sync::mpsc;
use tracing::{error, info};

use super::capture::{AudioFrame, CaptureBackend, CaptureSpec};

pub struct MicBackend {
    enabled: Arc<AtomicBool>,
    stop_tx: Option<std_mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl MicBackend {
    pub fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
            stop_tx: None,
            thread: None,
        }
    }
}

impl Default for MicBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MicBackend {
    async fn start(&mut self, _spec: &CaptureSpec) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.thread.is_some() {
            bail!("already capturing");
        }

        // Frames arrive in the device's native format; the recorder
        // converts to the requested rate and mono downstream.
        let (frame_tx, frame_rx) = mpsc::channel(64);
        let (stop_tx, stop_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = std_mpsc::channel();

        let enabled = Arc::clone(&self.enabled);
        enabled.store(true, Ordering::SeqCst);

        let thread = thread::Builder::new()
            .name("wavebridge-capture".into())
            .spawn(move || capture_thread(frame_tx, stop_rx, ready_tx, enabled))
            .context("failed to spawn capture thread")?;

        ready_rx
            .recv()
            .context("capture thread exited before initializing")??;

        self.stop_tx = Some(stop_tx);
        self.thread = Some(thread);

        Ok(frame_rx)
    }

    fn pause(&mut self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    fn resume(&mut self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                bail!("capture thread panicked");
            }
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.thread.is_some()
    }

    fn has_permission(&self) -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    fn name(&self) -> &str {
        "cpal microphone"
    }
}

fn capture_thread(
    frame_tx: mpsc::Sender<AudioFrame>,
    stop_rx: std_mpsc::Receiver<()>,
    ready_tx: std_mpsc::Sender<Result<()>>,
    enabled: Arc<AtomicBool>,
) {
    let init = (|| {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .context("no input device available")?;
        let config = device
            .default_input_config()
            .context("failed to query input format")?;

        info!(
            "microphone capture: {} ({}Hz, {} channels, {:?})",
            device.name().unwrap_or_else(|_| "unknown".into()),
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();
        let samples_seen = Arc::new(AtomicU64::new(0));

        let err_callback = |err: cpal::StreamError| {
            error!("capture stream error: {}", err);
        };

        macro_rules! build {
            ($ty:ty, $convert:expr) => {
                device.build_input_stream(
                    &config.clone().into(),
                    {
                        let frame_tx = frame_tx.clone();
                        let enabled = Arc::clone(&enabled);
                        let samples_seen = Arc::clone(&samples_seen);
                        move |data: &[$ty], _: &cpal::InputCallbackInfo| {
                            if !enabled.load(Ordering::Relaxed) {
                                return;
                            }
                            let seen = samples_seen
                                .fetch_add(data.len() as u64, Ordering::Relaxed);
                            let frame = AudioFrame {
                                samples: data.iter().map($convert).collect(),
                                sample_rate,
                                channels,
                                timestamp_ms: seen / channels as u64 * 1000
                                    / sample_rate as u64,
                            };
                            // Overflow is silently dropped; the callback
                            // must never block.
                            let _ = frame_tx.try_send(frame);
                        }
                    },
                    err_callback,
                    None,
                )
            };
        }

        let stream = match config.sample_format() {
            SampleFormat::I16 => build!(i16, |&s| s),
            SampleFormat::U16 => build!(u16, |&s| (s as i32 - 32768) as i16),
            SampleFormat::F32 => {
                build!(f32, |&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            }
            other => bail!("unsupported input sample format: {other:?}"),
        }
        .context("failed to build input stream")?;

        stream.play().context("failed to start input stream")?;
        Ok(stream)
    })();

    let _stream = match init {
        Ok(stream) => {
            let _ = ready_tx.send(Ok(()));
            stream
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    // Park until stop is requested or the backend is dropped.
    let _ = stop_rx.recv();
}
