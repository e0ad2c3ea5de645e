//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Keepsake configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading already validates; errors carry the failing key
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.dry_run());
        println!("  Blob Root: {}", config.storage.blob_root);
        println!("  Metadata Root: {}", config.storage.metadata_root);
        println!("  Archive Ceiling: {} bytes", config.export.max_archive_bytes);
        println!("  Parallel Batches: {}", config.export.parallel_batches);
        println!("  Archive Directory: {}", config.export.archive_dir);
        println!("  Catalog File: {}", config.export.catalog_file_name);
        println!("  Upload Retries: {}", config.export.upload_max_retries);
        if config.logging.local_enabled {
            println!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();
        Ok(0)
    }
}
