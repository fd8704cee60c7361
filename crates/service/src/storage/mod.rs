//! Storage abstractions for service layer
//!
//! Byte-level backends, whole-collection JSON persistence, the per-store
//! write queue, and the generic collection store the domain stores share.

pub mod backend;
pub mod collection;
pub mod json_persistence;
pub mod write_queue;
