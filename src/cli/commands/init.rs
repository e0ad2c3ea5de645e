//! Init command implementation
//!
//! This module implements the `init` command for generating a starter
//! configuration file.

use crate::config::parse_config;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "keepsake.toml")]
    pub output: String,

    /// Include every setting with its default value and a comment
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Keepsake configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set storage.blob_root and storage.metadata_root in {}", self.output);
                println!("  2. Validate configuration: keepsake validate-config");
                println!("  3. Run export: keepsake export --project <id>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> &'static str {
        r#"# Keepsake Configuration File

[application]
log_level = "info"

[storage]
blob_root = "./data/blobs"
metadata_root = "./data/metadata"

[export]
max_archive_bytes = 4294967296
"#
    }

    /// Generate configuration listing every setting
    fn generate_config_with_examples() -> &'static str {
        r#"# Keepsake Configuration File
#
# Values may reference environment variables as ${VAR_NAME}, and any key can
# be overridden with KEEPSAKE_<SECTION>_<KEY>, e.g. KEEPSAKE_EXPORT_DRY_RUN=true.

[application]
# trace | debug | info | warn | error
log_level = "info"
# Build archives without uploading or recording them
dry_run = false

[storage]
# Directory holding originals, related files and produced archives
blob_root = "./data/blobs"
# Directory holding projects/{id}.json and images/{id}.json
metadata_root = "./data/metadata"

[export]
# Ceiling on cumulative primary-file size per archive (bytes)
max_archive_bytes = 4294967296
# Batches assembled and uploaded at the same time (1-16)
parallel_batches = 1
# Project-wide metadata document, looked up under the storage prefix
catalog_file_name = "catalog.xmp"
# Archives are written to {storage_prefix}/{archive_dir}/
archive_dir = "archives"
# Cap on the sanitized project name in archive file names (1-128)
max_name_length = 50
# Upload retries after the first attempt (0-10)
upload_max_retries = 3
# Delay before each retry; the last value repeats
retry_backoff_ms = [500, 1000, 2000]
dry_run = false

[logging]
# Write JSON logs to local_path in addition to the console
local_enabled = false
local_path = "./logs"
# daily | hourly
local_rotation = "daily"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generated_configs_parse_and_validate() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config = parse_config(content).unwrap();
            assert!(config.validate().is_ok());
            assert_eq!(config.export.max_archive_bytes, 4_294_967_296);
        }
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("keepsake.toml");
        std::fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.display().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(std::fs::read_to_string(&output).unwrap().contains("[storage]"));
    }
}
