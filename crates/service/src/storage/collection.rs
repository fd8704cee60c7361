use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::ServiceError;
use crate::notify::{ChangeEvent, ChangeKind, ChangeNotifier, Snapshot};
use crate::observability;
use crate::storage::json_persistence::JsonPersistence;
use crate::storage::write_queue::{WriteQueue, WriteTicket};

/// A committed mutation result together with its pending write.
#[derive(Debug)]
pub struct Committed<T> {
    value: T,
    write: WriteTicket,
}

impl<T> Committed<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Take the value without waiting for the write.
    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn split(self) -> (T, WriteTicket) {
        (self.value, self.write)
    }

    /// Wait for the corresponding write to land, then return the value.
    pub async fn durable(self) -> Result<T, ServiceError> {
        self.write.wait().await?;
        Ok(self.value)
    }
}

/// In-memory ordered collection with write-through persistence.
///
/// The vector is the source of truth. Every mutation goes through
/// [`CollectionStore::apply`] or [`CollectionStore::commit`]: under the write
/// lock the change is applied, the result snapshotted, the snapshot enqueued
/// for writing and handed to the notifier. Saves and notifications therefore
/// follow commit order.
pub struct CollectionStore<T> {
    key: Arc<str>,
    items: RwLock<Vec<T>>,
    writer: WriteQueue<T>,
    notifier: Arc<dyn ChangeNotifier<T>>,
}

impl<T> CollectionStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Load the collection once (best effort) and start its writer.
    pub async fn open(
        persistence: &JsonPersistence,
        key: &str,
        notifier: Arc<dyn ChangeNotifier<T>>,
    ) -> Self {
        let key: Arc<str> = Arc::from(key);
        let items: Vec<T> = persistence.load(&key).await;
        info!(collection = %key, count = items.len(), "collection loaded");
        let writer = WriteQueue::spawn(persistence.clone(), key.clone());
        Self { key, items: RwLock::new(items), writer, notifier }
    }

    /// Run a read-only closure against the current collection.
    pub async fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let items = self.items.read().await;
        f(items.as_slice())
    }

    /// Apply a mutation that either changes the collection or is refused.
    ///
    /// The closure must not touch the collection before returning `Err`.
    pub async fn apply<R>(
        &self,
        kind: ChangeKind,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    ) -> Result<Committed<R>, ServiceError> {
        let mut items = self.items.write().await;
        let value = f(&mut *items)?;
        Ok(self.publish(&items, kind, value))
    }

    /// Like [`CollectionStore::apply`], but the closure may also return
    /// `Ok(None)` to signal that nothing changed: no write, no notification.
    pub async fn commit<R>(
        &self,
        kind: ChangeKind,
        f: impl FnOnce(&mut Vec<T>) -> Result<Option<R>, ServiceError>,
    ) -> Result<Option<Committed<R>>, ServiceError> {
        let mut items = self.items.write().await;
        match f(&mut *items)? {
            Some(value) => Ok(Some(self.publish(&items, kind, value))),
            None => Ok(None),
        }
    }

    // caller holds the write lock, which is what orders writes and events
    fn publish<R>(&self, items: &[T], kind: ChangeKind, value: R) -> Committed<R> {
        let snapshot: Snapshot<T> = Arc::from(items);
        let write = self.writer.enqueue(snapshot.clone());
        self.notifier.notify(ChangeEvent { collection: self.key.clone(), kind, snapshot });
        observability::record_mutation(&self.key, kind.as_str());
        Committed { value, write }
    }

    /// Wait for all writes enqueued so far.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{BroadcastNotifier, NoopNotifier};
    use crate::storage::backend::MemoryByteStore;

    async fn open(mem: &Arc<MemoryByteStore>, notifier: Arc<dyn ChangeNotifier<u32>>) -> CollectionStore<u32> {
        CollectionStore::open(&JsonPersistence::new(mem.clone()), "numbers", notifier).await
    }

    #[tokio::test]
    async fn refused_and_empty_commits_do_not_write() {
        let mem = Arc::new(MemoryByteStore::new());
        let store = open(&mem, Arc::new(NoopNotifier)).await;

        let refused: Result<Option<Committed<()>>, ServiceError> = store
            .commit(ChangeKind::Created, |_| Err(ServiceError::Validation("no".into())))
            .await;
        assert!(refused.is_err());

        let nothing: Option<Committed<()>> = store.commit(ChangeKind::Updated, |_| Ok(None)).await.unwrap();
        assert!(nothing.is_none());

        store.flush().await;
        assert_eq!(mem.write_count(), 0);
    }

    #[tokio::test]
    async fn notifications_follow_commit_order_with_commit_time_snapshots() {
        let mem = Arc::new(MemoryByteStore::new());
        let notifier = Arc::new(BroadcastNotifier::<u32>::new(16));
        let mut rx = notifier.subscribe();
        let store = open(&mem, notifier.clone()).await;

        for n in 1..=3u32 {
            store
                .commit(ChangeKind::Created, |items| {
                    items.push(n);
                    Ok(Some(n))
                })
                .await
                .unwrap();
        }

        for n in 1..=3usize {
            let ev = rx.recv().await.unwrap();
            assert_eq!(ev.snapshot.len(), n);
            assert_eq!(&*ev.collection, "numbers");
        }
    }

    #[tokio::test]
    async fn failed_write_keeps_memory_state() {
        let mem = Arc::new(MemoryByteStore::new());
        mem.set_fail_writes(true);
        let store = open(&mem, Arc::new(NoopNotifier)).await;

        let committed = store
            .apply(ChangeKind::Created, |items| {
                items.push(7);
                Ok(())
            })
            .await
            .unwrap();
        assert!(committed.durable().await.is_err());

        assert_eq!(store.read(|items| items.to_vec()).await, vec![7]);
    }
}
