pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod media;
pub mod player;
pub mod recorder;

pub use bridge::Bridge;
pub use config::Config;
pub use engine::{
    AudioFrame, AudioRoute, AudioRouteConfig, CaptureBackend, CaptureSpec, ClockPlayback,
    DurationKind, FinishMode, FrameCounter, MicBackend, PlaybackEngine, PlaybackHandle,
    RecognitionUpdate, RodioPlayback, RouteUsage, ScriptedSpeech, SpeechEngine, SpeechStream,
    ToneBackend,
};
pub use error::{BridgeError, Result};
pub use events::{CurrentDurationEvent, EventBus, FinishEvent, SessionEvent};
pub use player::{PlayerSession, PlayerState};
pub use recorder::{
    AudioEncoder, RecorderSession, RecordingResult, RecordingSettings, TranscriptUpdate,
    TranscriptWord,
};
