//! Method-call dispatch
//!
//! The host transport (method channel, RPC frame) is opaque; this module
//! is the surface it talks to: one named call per operation, key/value
//! argument payloads, values or tagged failures back, plus the
//! unsolicited event stream.

mod calls;
mod state;

pub use calls::method;
pub use state::Bridge;
