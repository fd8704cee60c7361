use crate::domain::{Product, ProductDraft, ProductPatch};
use crate::errors::ServiceError;
use crate::storage::collection::Committed;
use async_trait::async_trait;

/// Trait abstraction for catalog storage (product CRUD).
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list(&self) -> Vec<Product>;
    async fn list_bounded(&self, limit: Option<usize>) -> Vec<Product>;
    async fn get(&self, id: u64) -> Result<Product, ServiceError>;
    async fn create(&self, draft: ProductDraft) -> Result<Committed<Product>, ServiceError>;
    async fn update(&self, id: u64, patch: ProductPatch) -> Result<Committed<Product>, ServiceError>;
    async fn delete(&self, id: u64) -> Result<Committed<Product>, ServiceError>;
    /// Wait until every write enqueued so far has been attempted.
    async fn flush(&self);
}
