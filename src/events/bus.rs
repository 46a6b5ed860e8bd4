use tokio::sync::broadcast;
use tracing::trace;

use super::messages::SessionEvent;

/// Broadcast channel carrying unsolicited session events to the host.
///
/// Cloned into every session and background task; `subscribe` returns a
/// receiver and dropping it unsubscribes. Emission never blocks and is
/// tolerated with no subscribers attached.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        trace!("emit {}", event.name());
        // A send error only means nobody is listening right now.
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
