use anyhow::Result;
use tokio::sync::mpsc;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Capture parameters resolved from the caller's recording settings
#[derive(Debug, Clone)]
pub struct CaptureSpec {
    /// Target sample rate (frames are converted if the device differs)
    pub sample_rate: u32,
    /// Target channel count (recording is fixed to mono)
    pub channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl Default for CaptureSpec {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            buffer_duration_ms: 100,
        }
    }
}

/// Audio capture backend trait
///
/// The platform capture engine is opaque to the session layer; anything
/// that can produce a stream of PCM frames can record. Built-in
/// implementations: cpal microphone input and a deviceless tone source.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames until
    /// the backend is stopped.
    async fn start(&mut self, spec: &CaptureSpec) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Suspend frame production without tearing the device down
    fn pause(&mut self);

    /// Resume frame production after `pause`
    fn resume(&mut self);

    /// Stop capturing audio and release the device
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Whether the microphone permission is granted
    fn has_permission(&self) -> bool {
        true
    }

    /// Get backend name for logging
    fn name(&self) -> &str;
}
