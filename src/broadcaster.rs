//! Fan-out of task events to every connected observer
//!
//! Built on [`tokio::sync::broadcast`]: each observer owns a bounded receive
//! buffer, so a slow observer only loses its own events (and is told how many
//! through [`RecvError::Lagged`]) while the producer and other observers carry on.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio_stream::wrappers::BroadcastStream;

use crate::types::Event;

/// Process-wide event publisher, cheap to clone
#[derive(Clone, Debug)]
pub struct Broadcaster {
    tx: broadcast::Sender<Event>,
    next_observer: Arc<AtomicU64>,
}

/// A registered listener
#[derive(Debug)]
pub struct Observer {
    id: u64,
    rx: broadcast::Receiver<Event>,
}

impl Broadcaster {
    /// Create a broadcaster whose observers each buffer up to `capacity` events
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            next_observer: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a new observer; it receives events broadcast from now on
    pub fn subscribe(&self) -> Observer {
        let id = self.next_observer.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(observer = id, "Observer subscribed");
        Observer {
            id,
            rx: self.tx.subscribe(),
        }
    }

    /// Remove an observer; it receives nothing further
    pub fn unsubscribe(&self, observer: Observer) {
        tracing::debug!(observer = observer.id, "Observer unsubscribed");
        drop(observer);
    }

    /// Deliver an event to every current observer
    ///
    /// Never blocks and never fails; returns how many observers the event
    /// was queued for (zero when nobody is listening).
    pub fn broadcast(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Number of currently registered observers
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Observer {
    /// Identifier assigned at subscription
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next event
    ///
    /// Returns [`RecvError::Lagged`] if this observer fell behind and events
    /// were dropped for it; receiving can continue afterwards.
    pub async fn recv(&mut self) -> Result<Event, RecvError> {
        self.rx.recv().await
    }

    /// Consume the observer as a stream (used by the SSE endpoint)
    pub fn into_stream(self) -> BroadcastStream<Event> {
        BroadcastStream::new(self.rx)
    }
}
