//! Session event reporting
//!
//! Every asynchronous notification a session produces (position ticks,
//! finish events, transcript updates) funnels through one [`EventBus`] so
//! the host observes them in submission order, never interleaved with an
//! in-flight call.

mod bus;
mod messages;

pub use bus::EventBus;
pub use messages::{CurrentDurationEvent, FinishEvent, SessionEvent};
