//! File-backed stores built on [`crate::storage::collection::CollectionStore`].

pub mod cart_store;
pub mod product_store;
