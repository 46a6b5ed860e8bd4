use std::path::Path;
use std::time::Duration;

use anyhow::Result;

/// Policy applied when playback reaches end of media naturally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishMode {
    /// Rewind to zero and keep playing (finish code 0)
    Loop,
    /// Halt but keep the decode handle (finish code 1)
    PauseAtEnd,
    /// Halt and release the decode handle (finish code 2)
    StopAtEnd,
}

impl FinishMode {
    /// Mapping used by the bridge call: 0 = loop, 1 = pause, else stop
    pub fn from_id(id: Option<i32>) -> Self {
        match id {
            Some(0) => FinishMode::Loop,
            Some(1) => FinishMode::PauseAtEnd,
            _ => FinishMode::StopAtEnd,
        }
    }

    pub fn finish_type(self) -> i32 {
        match self {
            FinishMode::Loop => 0,
            FinishMode::PauseAtEnd => 1,
            FinishMode::StopAtEnd => 2,
        }
    }
}

/// Which duration a `getDuration` call asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationKind {
    Current,
    Total,
}

/// One live decode handle
///
/// A session owns at most one of these at a time; `prepare` fully drops
/// the previous handle before a new one is opened.
pub trait PlaybackHandle: Send {
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn stop(&mut self);

    fn seek(&mut self, position: Duration) -> Result<()>;

    fn set_volume(&mut self, volume: f32);

    fn set_rate(&mut self, rate: f32);

    /// Current playback position
    fn position(&self) -> Duration;

    /// Total media duration
    fn duration(&self) -> Duration;

    /// True once the media has played to its natural end
    fn is_finished(&self) -> bool;
}

/// Decoder/output engine that opens playback handles from file paths
pub trait PlaybackEngine: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PlaybackHandle>>;

    /// Engine name for logging
    fn name(&self) -> &str;
}
