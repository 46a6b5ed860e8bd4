//! Recording session management
//!
//! This module provides the `RecorderSession` lifecycle that manages:
//! - Capture from a pluggable backend
//! - Encoder sink output and amplitude metering
//! - Fan-out of raw buffers to an optional transcription sub-stream
//! - Settings parsing from caller key/value options

mod meter;
mod session;
mod settings;
mod sink;
mod transcript;

pub use meter::Meter;
pub use session::{RecorderSession, RecordingResult};
pub use settings::{AudioEncoder, RecordingSettings};
pub use sink::WavSink;
pub use transcript::{Transcript, TranscriptUpdate, TranscriptWord};
