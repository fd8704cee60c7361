//! Service layer: the catalog and cart stores.
//! - In-memory collections are the source of truth; files are whole-collection mirrors.
//! - Every committed mutation is written through a per-store single-writer queue
//!   and announced to a change notifier, both in commit order.
//! - Errors are reported through [`errors::ServiceError`]; nothing here is fatal.

pub mod domain;
pub mod errors;
pub mod file;
pub mod notify;
pub mod observability;
pub mod repository;
pub mod runtime;
pub mod storage;
