//! Store abstraction layer
//!
//! This module provides a trait-based abstraction over the blob store and the
//! metadata store, plus a factory building them from configuration.

pub mod factory;
pub mod traits;

pub use factory::create_stores;
pub use traits::{BlobStore, MetadataStore};
