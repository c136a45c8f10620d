use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::trace;
use tokio::sync::mpsc;

use super::ServiceEvent;

static NEXT_SINK_ID: AtomicU64 = AtomicU64::new(1);

/// Sending half of a service inbox.
///
/// Sinks are unbounded, so publishing never blocks. Two clones of the same
/// sink compare equal.
#[derive(Clone, Debug)]
pub struct EventSink {
    id: u64,
    tx: mpsc::UnboundedSender<ServiceEvent>,
}

impl EventSink {
    /// Creates an inbox and returns its sending and receiving halves.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServiceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            id: NEXT_SINK_ID.fetch_add(1, Ordering::Relaxed),
            tx,
        };
        (sink, rx)
    }

    /// Delivers an event. Returns false when the receiving side is gone.
    pub fn send(&self, event: ServiceEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl PartialEq for EventSink {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventSink {}

/// Fan-out publish/subscribe bus.
///
/// Delivery is best effort over a snapshot of the subscribers taken at
/// publish time; per sink, events arrive in publish order.
#[derive(Clone, Default)]
pub struct EventBus {
    sinks: Arc<Mutex<Vec<EventSink>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber. Subscribing the same sink twice is a no-op.
    pub fn subscribe(&self, sink: EventSink) {
        let mut sinks = self.lock();
        if !sinks.contains(&sink) {
            sinks.push(sink);
        }
    }

    pub fn unsubscribe(&self, sink: &EventSink) {
        self.lock().retain(|s| s != sink);
    }

    /// Sends the event to every current subscriber and prunes closed sinks.
    pub fn publish(&self, event: ServiceEvent) {
        let snapshot = self.lock().clone();

        let mut closed = Vec::new();
        for sink in &snapshot {
            if !sink.send(event.clone()) {
                closed.push(sink.id);
            }
        }

        if !closed.is_empty() {
            trace!("Pruning {} closed event sinks", closed.len());
            self.lock().retain(|s| !closed.contains(&s.id));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EventSink>> {
        self.sinks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
