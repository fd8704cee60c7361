use crate::domain::Cart;
use crate::errors::ServiceError;
use crate::file::cart_store::AddToCart;
use crate::storage::collection::Committed;
use async_trait::async_trait;

/// Trait abstraction for cart storage.
/// Implementations can be file-backed or anything that replaces whole collections.
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn create_cart(&self) -> Result<Committed<Cart>, ServiceError>;
    async fn get_cart(&self, id: &str) -> Result<Cart, ServiceError>;
    async fn add_product(&self, cart_id: &str, product_id: u64, quantity: Option<u32>) -> Result<AddToCart, ServiceError>;
    async fn flush(&self);
}
