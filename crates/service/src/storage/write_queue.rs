use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::errors::ServiceError;
use crate::notify::Snapshot;
use crate::storage::json_persistence::JsonPersistence;

enum WriteJob<T> {
    Save {
        snapshot: Snapshot<T>,
        done: oneshot::Sender<Result<(), ServiceError>>,
    },
    Flush {
        done: oneshot::Sender<()>,
    },
}

/// Single-writer queue for one collection.
///
/// Snapshots are written one at a time in the order they were enqueued, so
/// the durable content always converges on the last enqueued snapshot.
/// Enqueueing never waits for I/O.
pub struct WriteQueue<T> {
    key: Arc<str>,
    tx: mpsc::UnboundedSender<WriteJob<T>>,
}

impl<T> WriteQueue<T>
where
    T: Serialize + Send + Sync + 'static,
{
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(persistence: JsonPersistence, key: Arc<str>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(persistence, key.clone(), rx));
        Self { key, tx }
    }

    pub fn enqueue(&self, snapshot: Snapshot<T>) -> WriteTicket {
        let (done, rx) = oneshot::channel();
        if self.tx.send(WriteJob::Save { snapshot, done }).is_err() {
            // the dropped `done` makes the ticket report the failure
            warn!(collection = %self.key, "write queue is closed; snapshot not persisted");
        }
        WriteTicket { rx }
    }

    /// Wait until every write enqueued before this call has been attempted.
    pub async fn flush(&self) {
        let (done, rx) = oneshot::channel();
        if self.tx.send(WriteJob::Flush { done }).is_ok() {
            let _ = rx.await;
        }
    }
}

async fn run_writer<T: Serialize + Send + Sync>(
    persistence: JsonPersistence,
    key: Arc<str>,
    mut rx: mpsc::UnboundedReceiver<WriteJob<T>>,
) {
    while let Some(job) = rx.recv().await {
        match job {
            WriteJob::Save { snapshot, done } => {
                let result = persistence.save(&key, &snapshot[..]).await;
                let _ = done.send(result);
            }
            WriteJob::Flush { done } => {
                let _ = done.send(());
            }
        }
    }
    debug!(collection = %key, "write queue drained and closed");
}

/// Handle on one enqueued write. Dropping it does not cancel the write.
#[derive(Debug)]
pub struct WriteTicket {
    rx: oneshot::Receiver<Result<(), ServiceError>>,
}

impl WriteTicket {
    /// Wait for the write to land and report its outcome.
    pub async fn wait(self) -> Result<(), ServiceError> {
        self.rx
            .await
            .map_err(|_| ServiceError::Persistence("write queue closed before the write completed".into()))?
    }
}
