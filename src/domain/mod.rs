//! Domain models and types for Keepsake.
//!
//! This module contains the core domain models, types, and business rules.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ProjectId`], [`ImageId`], [`StorageKey`])
//! - **Domain models** ([`ImageRecord`], [`Project`], [`ArchivePart`])
//! - **Error types** ([`KeepsakeError`], [`StorageError`], [`CatalogError`], [`ContainerError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, KeepsakeError>`]:
//!
//! ```rust
//! use keepsake::domain::{KeepsakeError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = keepsake::config::KeepsakeConfig::from_file("keepsake.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod image;
pub mod project;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{CatalogError, ContainerError, KeepsakeError, StorageError};
pub use ids::{ImageId, ProjectId, StorageKey};
pub use image::{ColorLabel, ImageRecord, ImageRecordBuilder};
pub use project::{ArchivePart, ArchiveStatus, Project};
pub use result::Result;
