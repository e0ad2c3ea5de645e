//! Local filesystem backends
//!
//! [`FsBlobStore`] keeps objects as plain files keyed by their storage path.
//! [`JsonMetadataStore`] keeps project and image records as JSON documents.

pub mod blob;
pub mod catalog;

pub use blob::FsBlobStore;
pub use catalog::JsonMetadataStore;
