//! The client's event surface: connection lifecycle notices delivered out-of-band
//! from the synchronous call/response path.

use crate::errors::ClientError;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default capacity of the per-client event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A lifecycle or diagnostic event emitted by a [`Client`](crate::client::Client).
///
/// Each client owns its own emitter (no process-wide state): subscribe via
/// [`Client::subscribe`](crate::client::Client::subscribe).
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The session is ready: transport connected, tables preloaded if requested.
    Connected,
    /// The session ended. `had_error` distinguishes a clean `close()` from a transport failure.
    Closed { had_error: bool },
    /// A reconnect attempt has been scheduled or is starting.
    Reconnecting,
    /// A non-fatal transport or protocol error occurred (e.g. during demultiplexing,
    /// reconnect re-subscription, or a panicking notification callback).
    Error(Arc<ClientError>),
}

/// Per-client event emitter. Cheap to clone; every clone shares the same channel.
#[derive(Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventEmitter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribes to this client's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }

    /// Emits an event to every current subscriber. Silently dropped if nobody is listening.
    pub fn emit(&self, event: ClientEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let emitter = EventEmitter::new();
        let mut rx = emitter.subscribe();

        emitter.emit(ClientEvent::Connected);
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ClientEvent::Connected));
    }

    #[tokio::test]
    async fn emit_without_subscribers_does_not_panic() {
        let emitter = EventEmitter::new();
        emitter.emit(ClientEvent::Reconnecting);
    }
}
