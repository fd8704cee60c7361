//! Store interfaces exposed to the request-handling layer.

pub mod cart;
pub mod catalog;

pub use cart::CartRepository;
pub use catalog::CatalogRepository;
