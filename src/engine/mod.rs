//! Pluggable audio engines
//!
//! The platform decode/encode/speech engines are opaque to the session
//! layer; these traits are the seam. Device-backed implementations use
//! rodio (playback) and cpal (microphone); the `sim` module provides
//! deviceless engines for headless use and tests.

pub mod capture;
pub mod mic;
pub mod playback;
pub mod rodio;
pub mod route;
pub mod sim;
pub mod speech;

pub use capture::{AudioFrame, CaptureBackend, CaptureSpec};
pub use mic::MicBackend;
pub use playback::{DurationKind, FinishMode, PlaybackEngine, PlaybackHandle};
pub use self::rodio::RodioPlayback;
pub use route::{AudioRoute, AudioRouteConfig, RouteUsage};
pub use sim::{ClockPlayback, FrameCounter, ScriptedSpeech, ToneBackend};
pub use speech::{RecognitionUpdate, SpeechEngine, SpeechStream};
