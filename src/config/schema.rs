//! Configuration schema types
//!
//! This module defines the configuration structure for Keepsake.

use crate::domain::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main Keepsake configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeepsakeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Store locations
    pub storage: StorageConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl KeepsakeConfig {
    /// Loads, overrides and validates a configuration file
    ///
    /// Shorthand for [`load_config`](crate::config::load_config).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        crate::config::loader::load_config(path)
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.application.validate()?;
        self.storage.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Dry-run mode from either section
    pub fn dry_run(&self) -> bool {
        self.application.dry_run || self.export.dry_run
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (build archives but do not upload or record them)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Store locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the blob store
    #[serde(default = "default_blob_root")]
    pub blob_root: String,

    /// Root directory of the JSON metadata store
    #[serde(default = "default_metadata_root")]
    pub metadata_root: String,
}

impl StorageConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.blob_root.trim().is_empty() {
            return Err("storage.blob_root cannot be empty".to_string());
        }
        if self.metadata_root.trim().is_empty() {
            return Err("storage.metadata_root cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            blob_root: default_blob_root(),
            metadata_root: default_metadata_root(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Per-archive ceiling on cumulative primary-file size, in bytes
    #[serde(default = "default_max_archive_bytes")]
    pub max_archive_bytes: u64,

    /// Batches assembled and uploaded at the same time
    #[serde(default = "default_parallel_batches")]
    pub parallel_batches: usize,

    /// Project catalog file, looked up under the project's storage prefix
    #[serde(default = "default_catalog_file_name")]
    pub catalog_file_name: String,

    /// Directory under the storage prefix that receives archives
    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,

    /// Cap on the sanitized project name used in archive keys
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,

    /// Upload retries after the first attempt
    #[serde(default = "default_upload_max_retries")]
    pub upload_max_retries: u32,

    /// Retry backoff intervals in milliseconds; the last one repeats
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: Vec<u64>,

    /// Dry run mode - assemble archives without uploading or recording them
    #[serde(default)]
    pub dry_run: bool,
}

impl ExportConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.max_archive_bytes == 0 {
            return Err("export.max_archive_bytes must be > 0".to_string());
        }

        if self.parallel_batches == 0 || self.parallel_batches > 16 {
            return Err(format!(
                "export.parallel_batches must be between 1 and 16, got {}",
                self.parallel_batches
            ));
        }

        if self.max_name_length == 0 || self.max_name_length > 128 {
            return Err(format!(
                "export.max_name_length must be between 1 and 128, got {}",
                self.max_name_length
            ));
        }

        if self.upload_max_retries > 10 {
            return Err(format!(
                "export.upload_max_retries must be <= 10, got {}",
                self.upload_max_retries
            ));
        }

        let catalog = self.catalog_file_name.trim();
        if catalog.is_empty() || catalog.contains('/') {
            return Err(format!(
                "export.catalog_file_name must be a plain file name, got '{}'",
                self.catalog_file_name
            ));
        }

        if self.archive_dir.split('/').any(|segment| segment == "..") {
            return Err(format!(
                "export.archive_dir cannot contain '..', got '{}'",
                self.archive_dir
            ));
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_archive_bytes: default_max_archive_bytes(),
            parallel_batches: default_parallel_batches(),
            catalog_file_name: default_catalog_file_name(),
            archive_dir: default_archive_dir(),
            max_name_length: default_max_name_length(),
            upload_max_retries: default_upload_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            dry_run: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when local_enabled = true".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_blob_root() -> String {
    "./data/blobs".to_string()
}

fn default_metadata_root() -> String {
    "./data/metadata".to_string()
}

fn default_max_archive_bytes() -> u64 {
    4 * 1024 * 1024 * 1024
}

fn default_parallel_batches() -> usize {
    1
}

fn default_catalog_file_name() -> String {
    "catalog.xmp".to_string()
}

fn default_archive_dir() -> String {
    "archives".to_string()
}

fn default_max_name_length() -> usize {
    50
}

fn default_upload_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> Vec<u64> {
    vec![500, 1000, 2000]
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
