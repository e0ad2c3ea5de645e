//! Export command implementation
//!
//! This module implements the `export` command, which packages one project's
//! images into size-bounded archives.

use crate::config::load_config;
use crate::core::export::{ExportCoordinator, ExportSummary};
use crate::domain::ProjectId;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Project to export
    #[arg(short, long)]
    pub project: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - build archives without uploading or recording them
    #[arg(long)]
    pub dry_run: bool,

    /// Override the per-archive size ceiling in bytes
    #[arg(long, value_name = "BYTES")]
    pub max_archive_bytes: Option<u64>,

    /// Override the number of batches processed at once
    #[arg(long, value_name = "N")]
    pub parallel_batches: Option<usize>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(project_id = %self.project, "Starting export command");

        let project_id = match ProjectId::new(self.project.as_str()) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid project: {e}");
                return Ok(2);
            }
        };

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        // Apply CLI overrides
        if let Some(bytes) = self.max_archive_bytes {
            tracing::info!(max_archive_bytes = bytes, "Overriding archive ceiling from CLI");
            config.export.max_archive_bytes = bytes;
        }
        if let Some(parallel) = self.parallel_batches {
            tracing::info!(parallel_batches = parallel, "Overriding batch concurrency from CLI");
            config.export.parallel_batches = parallel;
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.export.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let dry_run = config.dry_run();
        if dry_run {
            println!("🔍 DRY RUN MODE - Archives will not be uploaded or recorded");
            println!();
        }

        // Confirmation prompt (unless --yes or dry-run)
        if !self.yes && !dry_run {
            println!("Export Configuration:");
            println!("  Project: {project_id}");
            println!("  Archive ceiling: {} bytes", config.export.max_archive_bytes);
            println!("  Parallel batches: {}", config.export.parallel_batches);
            println!("  Blob store: {}", config.storage.blob_root);
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        let coordinator = match ExportCoordinator::new(config, shutdown_signal).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export coordinator");
                eprintln!("Failed to initialize export: {e}");
                return Ok(4);
            }
        };

        println!("🚀 Exporting project {project_id}...");
        println!();

        let summary = match coordinator.execute_export(&project_id).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(5);
            }
        };

        print_summary(&summary);
        Ok(exit_code(&summary))
    }
}

fn print_summary(summary: &ExportSummary) {
    if summary.empty {
        println!("ℹ️  Project has no images; nothing was exported.");
        return;
    }

    println!("📊 Export Summary:");
    println!("  Run: {}", summary.run_id);
    println!("  Images: {}", summary.total_images);
    println!("  Batches: {}", summary.total_batches);
    println!("  Entries added: {}", summary.successful_entries);
    println!("  Entries skipped: {}", summary.failed_entries);
    println!("  Archive bytes: {}", summary.total_archive_bytes());
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    println!("📦 Archive parts:");
    for part in &summary.parts {
        println!(
            "  [{}] #{} {} ({} bytes, {} images, {} skipped)",
            part.status, part.part_number, part.key, part.size_bytes, part.image_count, part.failed_count
        );
    }
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Issues encountered:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }
}

/// Exit code for a finished run
fn exit_code(summary: &ExportSummary) -> i32 {
    if summary.interrupted {
        println!("⚠️  Export interrupted. Parts produced so far were recorded.");
        130
    } else if summary.is_successful() {
        println!("✅ Export completed successfully!");
        0
    } else {
        println!("⚠️  Export completed with failures");
        1
    }
}
