use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::Cart;
use crate::errors::ServiceError;
use crate::notify::{ChangeKind, ChangeNotifier};
use crate::repository::cart::CartRepository;
use crate::storage::collection::{CollectionStore, Committed};
use crate::storage::json_persistence::JsonPersistence;

/// Outcome of adding a product to a cart.
#[derive(Debug)]
pub enum AddToCart {
    Updated(Committed<Cart>),
    /// The cart id did not resolve; nothing was created, written or notified.
    NoOp,
}

/// File-backed cart collection.
pub struct CartStore {
    inner: CollectionStore<Cart>,
    last_id: AtomicI64,
}

impl CartStore {
    pub async fn open(
        persistence: &JsonPersistence,
        key: &str,
        notifier: Arc<dyn ChangeNotifier<Cart>>,
    ) -> Arc<Self> {
        let inner = CollectionStore::open(persistence, key, notifier).await;
        Arc::new(Self { inner, last_id: AtomicI64::new(0) })
    }

    // Millisecond timestamp, bumped so ids stay strictly increasing within the
    // process and never hit an id already in the collection. Only called with
    // the collection write lock held.
    fn next_id(&self, carts: &[Cart]) -> String {
        let mut candidate = Utc::now().timestamp_millis().max(self.last_id.load(Ordering::SeqCst) + 1);
        while carts.iter().any(|c| c.id == candidate.to_string()) {
            candidate += 1;
        }
        self.last_id.store(candidate, Ordering::SeqCst);
        candidate.to_string()
    }

    pub async fn create_cart(&self) -> Result<Committed<Cart>, ServiceError> {
        let committed = self
            .inner
            .apply(ChangeKind::Created, |carts| {
                let cart = Cart::new(self.next_id(carts));
                carts.push(cart.clone());
                Ok(cart)
            })
            .await?;
        info!(cart_id = %committed.value().id, "cart created");
        Ok(committed)
    }

    pub async fn get_cart(&self, id: &str) -> Result<Cart, ServiceError> {
        self.inner
            .read(|carts| carts.iter().find(|c| c.id == id).cloned())
            .await
            .ok_or_else(|| ServiceError::not_found("cart"))
    }

    pub async fn list(&self) -> Vec<Cart> {
        self.inner.read(|carts| carts.to_vec()).await
    }

    /// Add `quantity` (default 1 when missing or zero) of a product to a cart.
    ///
    /// The product id is not checked against the catalog. An unknown cart id
    /// is a silent no-op.
    pub async fn add_product(
        &self,
        cart_id: &str,
        product_id: u64,
        quantity: Option<u32>,
    ) -> Result<AddToCart, ServiceError> {
        let quantity = quantity.filter(|q| *q > 0).unwrap_or(1);
        let committed = self
            .inner
            .commit(ChangeKind::Updated, |carts| {
                let Some(cart) = carts.iter_mut().find(|c| c.id == cart_id) else {
                    return Ok(None);
                };
                cart.add(product_id, quantity);
                Ok(Some(cart.clone()))
            })
            .await?;
        match committed {
            Some(c) => {
                info!(cart_id, product_id, quantity, "product added to cart");
                Ok(AddToCart::Updated(c))
            }
            None => {
                debug!(cart_id, product_id, "cart not found; nothing added");
                Ok(AddToCart::NoOp)
            }
        }
    }

    /// Wait for every write enqueued so far.
    pub async fn flush(&self) {
        self.inner.flush().await;
    }
}

#[async_trait::async_trait]
impl CartRepository for CartStore {
    async fn create_cart(&self) -> Result<Committed<Cart>, ServiceError> { self.create_cart().await }
    async fn get_cart(&self, id: &str) -> Result<Cart, ServiceError> { self.get_cart(id).await }
    async fn add_product(&self, cart_id: &str, product_id: u64, quantity: Option<u32>) -> Result<AddToCart, ServiceError> {
        self.add_product(cart_id, product_id, quantity).await
    }
    async fn flush(&self) { self.flush().await }
}
