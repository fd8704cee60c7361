use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use crate::errors::ServiceError;
use crate::observability;
use crate::storage::backend::ByteStore;

/// Load/replace whole JSON collections against a [`ByteStore`].
///
/// `load` never fails: a missing, unreadable or undecodable resource yields an
/// empty collection. `save` serialises the full collection and replaces the
/// resource; failures are logged and returned, never retried.
#[derive(Clone)]
pub struct JsonPersistence {
    backend: Arc<dyn ByteStore>,
}

impl JsonPersistence {
    pub fn new(backend: Arc<dyn ByteStore>) -> Self {
        Self { backend }
    }

    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let bytes = match self.backend.read(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(collection = key, "no backing resource yet; starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(collection = key, error = %e, "cannot read collection; starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Vec<T>>(&bytes) {
            Ok(items) => items,
            Err(e) => {
                warn!(collection = key, error = %e, "cannot decode collection; starting empty");
                Vec::new()
            }
        }
    }

    pub async fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), ServiceError> {
        let result = match serde_json::to_vec_pretty(items) {
            Ok(data) => self.backend.write(key, data).await,
            Err(e) => Err(ServiceError::persistence(e)),
        };
        match &result {
            Ok(()) => observability::record_write(key),
            Err(e) => {
                observability::record_write_failure(key);
                error!(collection = key, error = %e, "failed to persist collection");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::{FsByteStore, MemoryByteStore};
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u32,
        name: String,
    }

    #[tokio::test]
    async fn load_missing_or_corrupt_is_empty() {
        let mem = Arc::new(MemoryByteStore::new());
        let persistence = JsonPersistence::new(mem.clone());

        let rows: Vec<Row> = persistence.load("rows").await;
        assert!(rows.is_empty());

        mem.insert_raw("rows", "{ not json");
        let rows: Vec<Row> = persistence.load("rows").await;
        assert!(rows.is_empty());

        // valid json, wrong shape
        mem.insert_raw("rows", r#"{"id": 1}"#);
        let rows: Vec<Row> = persistence.load("rows").await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_on_disk() -> Result<(), anyhow::Error> {
        let root = std::env::temp_dir().join(format!("json_persistence_{}", Uuid::new_v4()));
        let persistence = JsonPersistence::new(Arc::new(FsByteStore::new(&root)));
        let rows = vec![
            Row { id: 1, name: "a".into() },
            Row { id: 2, name: "b".into() },
        ];

        persistence.save("rows", &rows).await?;
        let reloaded: Vec<Row> = persistence.load("rows").await;
        assert_eq!(reloaded, rows);

        // human-readable, indented output
        let text = tokio::fs::read_to_string(root.join("rows.json")).await?;
        assert!(text.contains("\n  {"));

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_failure_is_reported() {
        let mem = Arc::new(MemoryByteStore::new());
        mem.set_fail_writes(true);
        let persistence = JsonPersistence::new(mem);
        let rows = vec![Row { id: 1, name: "a".into() }];
        assert!(matches!(persistence.save("rows", &rows).await, Err(ServiceError::Persistence(_))));
    }
}
