//! Playback session management

mod session;

pub use session::{PlayerSession, PlayerState};
