// Keepsake - Photo project archive exporter
// Copyright (c) 2025 Keepsake Contributors
// Licensed under the MIT License

//! # Keepsake - Photo project archive exporter
//!
//! Keepsake turns a named collection of stored images into one or more
//! downloadable zip archives. Curation metadata (rating, color label,
//! keywords, description) is embedded directly into JPEG files and written as
//! XMP sidecars next to RAW files.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Planning** size-bounded batches under a per-archive byte ceiling
//! - **Embedding** XMP packets into JPEG streams without touching pixel data
//! - **Assembling** uncompressed archives with collision-free entry names
//! - **Recording** every produced archive part back on the project
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (export, metadata)
//! - [`adapters`] - Blob store and metadata store backends
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keepsake::config::KeepsakeConfig;
//! use keepsake::core::export::ExportCoordinator;
//! use keepsake::domain::ProjectId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = KeepsakeConfig::from_file("keepsake.toml")?;
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let coordinator = ExportCoordinator::new(config, shutdown_rx).await?;
//!
//!     let summary = coordinator.execute_export(&ProjectId::new("proj-2024-sw")?).await?;
//!
//!     println!("Produced {} archive part(s)", summary.parts.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Metadata Embedding
//!
//! ```rust
//! use keepsake::core::metadata::{embed, extract};
//!
//! let jpeg = [0xFF, 0xD8, 0xFF, 0xD9];
//! let embedded = embed(&jpeg, "<x:xmpmeta/>").unwrap();
//! assert_eq!(extract(&embedded).unwrap().as_deref(), Some("<x:xmpmeta/>"));
//! ```
//!
//! ## Error Handling
//!
//! Only a failure to load the project or its images aborts a run. Failed
//! files, embedding fallbacks and failed uploads are counted and reported in
//! the [`core::export::ExportSummary`], so a finished run must be inspected:
//!
//! ```rust,no_run
//! use keepsake::core::export::ExportSummary;
//!
//! fn report(summary: &ExportSummary) {
//!     for part in summary.failed_parts() {
//!         eprintln!("part {} failed: {}", part.part_number, part.key);
//!     }
//! }
//! ```
//!
//! ## Logging
//!
//! Keepsake uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(project_id = "proj-2024-sw", "Starting export");
//! warn!(key = "projects/sw/IMG_0001.jpg", "Skipping file that could not be fetched");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
