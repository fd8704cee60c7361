//! Catalog and cart records plus their input types.

pub mod cart;
pub mod product;

pub use cart::{Cart, CartItem};
pub use product::{NewProduct, Product, ProductDraft, ProductPatch};
