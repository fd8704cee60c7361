use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{Product, ProductDraft, ProductPatch};
use crate::errors::ServiceError;
use crate::notify::{ChangeKind, ChangeNotifier};
use crate::repository::catalog::CatalogRepository;
use crate::storage::collection::{CollectionStore, Committed};
use crate::storage::json_persistence::JsonPersistence;

/// File-backed product catalog.
///
/// Ids are `collection length + 1` at creation time, which is not monotonic:
/// after a delete the next create can reuse an id that is still live. Lookups,
/// updates and deletes act on the first record carrying the id.
pub struct ProductStore {
    inner: CollectionStore<Product>,
}

impl ProductStore {
    /// Load the catalog stored under `key`; starts empty if nothing usable is there.
    pub async fn open(
        persistence: &JsonPersistence,
        key: &str,
        notifier: Arc<dyn ChangeNotifier<Product>>,
    ) -> Arc<Self> {
        let inner = CollectionStore::open(persistence, key, notifier).await;
        Arc::new(Self { inner })
    }

    /// All products, in insertion order.
    pub async fn list(&self) -> Vec<Product> {
        self.inner.read(|items| items.to_vec()).await
    }

    /// The first `limit` products; `None` means all of them.
    pub async fn list_bounded(&self, limit: Option<usize>) -> Vec<Product> {
        self.inner
            .read(|items| match limit {
                Some(n) => items.iter().take(n).cloned().collect(),
                None => items.to_vec(),
            })
            .await
    }

    pub async fn get(&self, id: u64) -> Result<Product, ServiceError> {
        let found = self.inner.read(|items| items.iter().find(|p| p.id == id).cloned()).await;
        found.ok_or_else(|| {
            warn!(product_id = id, "product not found");
            ServiceError::not_found("product")
        })
    }

    /// Validate, check `code` uniqueness, assign an id, append and persist.
    pub async fn create(&self, draft: ProductDraft) -> Result<Committed<Product>, ServiceError> {
        let new = draft.validate().map_err(|e| {
            warn!(error = %e, "rejected product draft");
            e
        })?;
        let committed = self
            .inner
            .apply(ChangeKind::Created, |items| {
                if items.iter().any(|p| p.code == new.code) {
                    warn!(code = %new.code, "product code already exists");
                    return Err(ServiceError::DuplicateKey(format!("product code {} already exists", new.code)));
                }
                let product = new.with_id(items.len() as u64 + 1);
                items.push(product.clone());
                Ok(product)
            })
            .await?;
        info!(product_id = committed.value().id, code = %committed.value().code, "product created");
        Ok(committed)
    }

    /// Shallow-merge `patch` onto the product and persist.
    pub async fn update(&self, id: u64, patch: ProductPatch) -> Result<Committed<Product>, ServiceError> {
        let committed = self
            .inner
            .apply(ChangeKind::Updated, |items| {
                let product = items.iter_mut().find(|p| p.id == id).ok_or_else(|| {
                    warn!(product_id = id, "product not found");
                    ServiceError::not_found("product")
                })?;
                patch.apply_to(product);
                Ok(product.clone())
            })
            .await?;
        info!(product_id = id, "product updated");
        Ok(committed)
    }

    /// Remove the product and persist; returns the removed record.
    pub async fn delete(&self, id: u64) -> Result<Committed<Product>, ServiceError> {
        let committed = self
            .inner
            .apply(ChangeKind::Deleted, |items| {
                let index = items.iter().position(|p| p.id == id).ok_or_else(|| {
                    warn!(product_id = id, "product not found");
                    ServiceError::not_found("product")
                })?;
                Ok(items.remove(index))
            })
            .await?;
        info!(product_id = id, "product deleted");
        Ok(committed)
    }

    /// Wait for every write enqueued so far.
    pub async fn flush(&self) {
        self.inner.flush().await;
    }
}

#[async_trait::async_trait]
impl CatalogRepository for ProductStore {
    async fn list(&self) -> Vec<Product> { self.list().await }
    async fn list_bounded(&self, limit: Option<usize>) -> Vec<Product> { self.list_bounded(limit).await }
    async fn get(&self, id: u64) -> Result<Product, ServiceError> { self.get(id).await }
    async fn create(&self, draft: ProductDraft) -> Result<Committed<Product>, ServiceError> { self.create(draft).await }
    async fn update(&self, id: u64, patch: ProductPatch) -> Result<Committed<Product>, ServiceError> { self.update(id, patch).await }
    async fn delete(&self, id: u64) -> Result<Committed<Product>, ServiceError> { self.delete(id).await }
    async fn flush(&self) { self.flush().await }
}
