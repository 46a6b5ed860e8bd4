use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Output route selection, recorded at prepare time and applied when
/// playback or capture actually starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioRoute {
    Speaker,
    Earpiece,
}

impl AudioRoute {
    /// Bridge mapping: 1 = earpiece, anything else = speaker
    pub fn from_id(id: Option<i32>) -> Self {
        match id {
            Some(1) => AudioRoute::Earpiece,
            _ => AudioRoute::Speaker,
        }
    }
}

/// How the shared audio path is being used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteUsage {
    Playback,
    PlayAndRecord { voice_processing: bool },
}

#[derive(Debug, Clone)]
struct RouteState {
    route: AudioRoute,
    usage: RouteUsage,
    /// Session key that last configured the shared path
    owner: String,
}

/// Explicit stand-in for the process-wide audio session singleton.
///
/// Ownership of "who last configured it" is recorded instead of being
/// implicit in call ordering. Sessions apply their routing through this
/// just-in-time at start, never eagerly at prepare: many sessions may be
/// prepared while only one is active.
#[derive(Default)]
pub struct AudioRouteConfig {
    state: Mutex<Option<RouteState>>,
}

impl AudioRouteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&self, route: AudioRoute, usage: RouteUsage, owner: &str) {
        info!("audio route -> {:?} ({:?}) configured by {}", route, usage, owner);
        let mut state = self.state.lock().expect("route lock poisoned");
        *state = Some(RouteState {
            route,
            usage,
            owner: owner.to_string(),
        });
    }

    /// Current route and the session key that set it, if any
    pub fn current(&self) -> Option<(AudioRoute, RouteUsage, String)> {
        let state = self.state.lock().expect("route lock poisoned");
        state.as_ref().map(|s| (s.route, s.usage, s.owner.clone()))
    }
}
