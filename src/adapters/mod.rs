//! Storage integrations for Keepsake.
//!
//! This module provides adapters for the two stores an export talks to:
//!
//! - [`store`] - Store abstraction layer (trait-based) and factory
//! - [`filesystem`] - Local directory blob store and JSON metadata store
//! - [`memory`] - In-memory stores with fault injection
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate storage backends and
//! enable testing with in-memory implementations. The export engine only sees
//! `Arc<dyn BlobStore>` and `Arc<dyn MetadataStore>`.
//!
//! ```rust,no_run
//! use keepsake::adapters::filesystem::{FsBlobStore, JsonMetadataStore};
//! use keepsake::adapters::store::{BlobStore, MetadataStore};
//! use keepsake::domain::ProjectId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let metadata = JsonMetadataStore::new("/srv/keepsake/metadata");
//! let blobs = FsBlobStore::new("/srv/keepsake/blobs");
//!
//! let project = metadata.get_project(&ProjectId::new("proj-2024-sw")?).await?;
//! let images = metadata.query_images(&project.id).await?;
//! for image in &images {
//!     let bytes = blobs.get(&image.primary_key).await?;
//!     println!("{} ({} bytes)", image.primary_key, bytes.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod filesystem;
pub mod memory;
pub mod store;
