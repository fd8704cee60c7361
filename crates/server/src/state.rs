use std::sync::Arc;

use configs::StorageConfig;
use service::{
    domain::Product,
    file::{cart_store::CartStore, product_store::ProductStore},
    notify::{BroadcastNotifier, NoopNotifier},
    repository::{CartRepository, CatalogRepository},
    storage::{backend::ByteStore, json_persistence::JsonPersistence},
};

/// Shared handles for every route and socket.
#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub carts: Arc<dyn CartRepository>,
    /// Catalog change feed; each event carries the full product list.
    pub product_events: Arc<BroadcastNotifier<Product>>,
}

impl ServerState {
    /// Open both collections on `backend`. Cart changes are not pushed anywhere.
    pub async fn open(backend: Arc<dyn ByteStore>, storage: &StorageConfig, channel_capacity: usize) -> Self {
        let persistence = JsonPersistence::new(backend);
        let product_events = Arc::new(BroadcastNotifier::<Product>::new(channel_capacity));
        let catalog = ProductStore::open(&persistence, &storage.products_key, product_events.clone()).await;
        let carts = CartStore::open(&persistence, &storage.carts_key, Arc::new(NoopNotifier)).await;
        Self { catalog, carts, product_events }
    }

    /// Wait for both write queues to drain.
    pub async fn flush(&self) {
        self.catalog.flush().await;
        self.carts.flush().await;
    }
}
