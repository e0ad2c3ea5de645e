//! Configuration management for Keepsake.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Keepsake uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `KEEPSAKE_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use keepsake::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("keepsake.toml")?;
//!
//! println!("Blob store: {}", config.storage.blob_root);
//! println!("Archive ceiling: {} bytes", config.export.max_archive_bytes);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`StorageConfig`] - Blob store and metadata store roots
//! - [`ExportConfig`] - Archive ceiling, naming, concurrency and upload retries
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [storage]
//! blob_root = "${KEEPSAKE_DATA}/blobs"
//! metadata_root = "${KEEPSAKE_DATA}/metadata"
//!
//! [export]
//! max_archive_bytes = 4294967296
//! parallel_batches = 2
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{ApplicationConfig, ExportConfig, KeepsakeConfig, LoggingConfig, StorageConfig};
