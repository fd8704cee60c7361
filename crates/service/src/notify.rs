//! Change notification
//!
//! Stores hand a full snapshot of their collection to a [`ChangeNotifier`]
//! after every committed mutation, in commit order. Delivery to clients
//! (websocket, SSE, ...) is the transport's business; the broadcast notifier
//! only fans events out to whoever subscribed.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::trace;

/// Immutable view of a collection at commit time.
pub type Snapshot<T> = Arc<[T]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChangeEvent<T> {
    pub collection: Arc<str>,
    pub kind: ChangeKind,
    pub snapshot: Snapshot<T>,
}

/// Observer of committed mutations. Called while the store still holds its
/// write lock, so implementations must not block.
pub trait ChangeNotifier<T>: Send + Sync {
    fn notify(&self, event: ChangeEvent<T>);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl<T> ChangeNotifier<T> for NoopNotifier {
    fn notify(&self, _event: ChangeEvent<T>) {}
}

/// Fan-out over a tokio broadcast channel.
///
/// Slow receivers lag and lose the oldest events; since each event carries a
/// full snapshot, the next one received is still a complete picture.
#[derive(Debug)]
pub struct BroadcastNotifier<T> {
    tx: broadcast::Sender<ChangeEvent<T>>,
}

impl<T: Clone + Send + Sync + 'static> BroadcastNotifier<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent<T>> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone + Send + Sync + 'static> ChangeNotifier<T> for BroadcastNotifier<T> {
    fn notify(&self, event: ChangeEvent<T>) {
        let collection = event.collection.clone();
        if self.tx.send(event).is_err() {
            trace!(collection = %collection, "no subscribers for change event");
        }
    }
}
