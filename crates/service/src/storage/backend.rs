use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs;

use crate::errors::ServiceError;

/// Byte-oriented backing medium addressed by collection key.
///
/// Only "read the whole resource" and "replace the whole resource" are
/// required; nothing here assumes incremental writes.
#[async_trait]
pub trait ByteStore: Send + Sync {
    /// Read the full content for `key`; `Ok(None)` when the resource is absent.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ServiceError>;
    /// Replace the full content for `key`.
    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), ServiceError>;
}

/// Filesystem backend: key `k` lives at `<root>/<k>.json`.
#[derive(Clone, Debug)]
pub struct FsByteStore {
    root: PathBuf,
}

impl FsByteStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the file path for a key. Keys are plain names, never paths.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, ServiceError> {
        if key.trim().is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(ServiceError::Persistence(format!("invalid collection key: {key:?}")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl ByteStore for FsByteStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ServiceError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServiceError::persistence(e)),
        }
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), ServiceError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(ServiceError::persistence)?;
        }
        // write-to-temp then rename, so a crash never leaves a half-written file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await.map_err(ServiceError::persistence)?;
        fs::rename(&tmp, &path).await.map_err(ServiceError::persistence)?;
        Ok(())
    }
}

/// In-memory backend. Counts writes and can be switched to fail them.
#[derive(Debug, Default)]
pub struct MemoryByteStore {
    entries: DashMap<String, Vec<u8>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryByteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw content for a key without counting it as a write.
    pub fn insert_raw(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(key.to_string(), bytes.into());
    }

    pub fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ByteStore for MemoryByteStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ServiceError> {
        Ok(self.get_raw(key))
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), ServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::Persistence(format!("write to {key} rejected")));
        }
        self.entries.insert(key.to_string(), bytes);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn fs_store_reads_none_when_missing_and_replaces_content() -> Result<(), anyhow::Error> {
        let root = std::env::temp_dir().join(format!("fs_byte_store_{}", Uuid::new_v4()));
        let store = FsByteStore::new(&root);

        assert!(store.read("products").await?.is_none());

        store.write("products", b"[1]".to_vec()).await?;
        store.write("products", b"[2]".to_vec()).await?;
        assert_eq!(store.read("products").await?, Some(b"[2]".to_vec()));

        // no temp file left behind after rename
        assert!(!root.join("products.json.tmp").exists());

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[test]
    fn fs_store_rejects_path_like_keys() {
        let store = FsByteStore::new("data");
        assert!(store.path_for("../etc").is_err());
        assert!(store.path_for("a/b").is_err());
        assert!(store.path_for("").is_err());
        assert_eq!(store.path_for("carts").unwrap(), PathBuf::from("data").join("carts.json"));
    }

    #[tokio::test]
    async fn memory_store_counts_and_fails_writes() {
        let store = MemoryByteStore::new();
        store.insert_raw("k", "seed");
        assert_eq!(store.write_count(), 0);

        store.write("k", b"v1".to_vec()).await.unwrap();
        assert_eq!(store.write_count(), 1);

        store.set_fail_writes(true);
        assert!(matches!(store.write("k", b"v2".to_vec()).await, Err(ServiceError::Persistence(_))));
        assert_eq!(store.get_raw("k"), Some(b"v1".to_vec()));
        assert_eq!(store.write_count(), 1);
    }
}
