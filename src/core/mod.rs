//! Core business logic for Keepsake.
//!
//! # Modules
//!
//! - [`export`] - Batch planning, archive assembly and export coordination
//! - [`metadata`] - Format classification, XMP rendering and JPEG embedding
//!
//! # Export Workflow
//!
//! 1. **Load**: Read the project and its image records from the metadata store
//! 2. **Plan**: Sort images by storage key and split them into size-bounded batches
//! 3. **Assemble**: Build one uncompressed archive per batch, embedding metadata
//! 4. **Upload**: Store each archive in the blob store, retrying on failure
//! 5. **Record**: Replace the project's archive part list in one update
//! 6. **Report**: Return an export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use keepsake::config::load_config;
//! use keepsake::core::export::ExportCoordinator;
//! use keepsake::domain::ProjectId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("keepsake.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = ExportCoordinator::new(config, shutdown_rx).await?;
//!
//! let summary = coordinator.execute_export(&ProjectId::new("proj-2024-sw")?).await?;
//!
//! for part in &summary.parts {
//!     println!("{} {} ({} bytes)", part.status, part.key, part.size_bytes);
//! }
//! println!("Entries added: {}", summary.successful_entries);
//! println!("Entries skipped: {}", summary.failed_entries);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod metadata;
