use serde::{Deserialize, Serialize};

/// One product line in a cart. Older files wrote the product id as `id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    #[serde(rename = "productId", alias = "id")]
    pub product_id: u64,
    pub quantity: u32,
}

/// Older files named the item list `products`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    pub id: String,
    #[serde(default, alias = "products")]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new(id: String) -> Self {
        Self { id, items: Vec::new() }
    }

    /// Upsert: add to the existing line for `product_id`, or append a new one.
    pub fn add(&mut self, product_id: u64, quantity: u32) {
        match self.items.iter_mut().find(|item| item.product_id == product_id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem { product_id, quantity }),
        }
    }
}
