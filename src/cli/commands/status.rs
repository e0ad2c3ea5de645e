//! Status command implementation
//!
//! This module implements the `status` command, which lists the archive parts
//! recorded for a project by its latest export.

use crate::adapters::store::create_stores;
use crate::config::load_config;
use crate::domain::{ArchiveStatus, ProjectId};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Project to inspect
    #[arg(short, long)]
    pub project: String,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(project_id = %self.project, "Checking export status");

        println!("📊 Export Status");
        println!();

        let project_id = match ProjectId::new(self.project.as_str()) {
            Ok(id) => id,
            Err(e) => {
                println!("❌ Invalid project: {e}");
                return Ok(2);
            }
        };

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let (_, metadata) = match create_stores(&config).await {
            Ok(stores) => stores,
            Err(e) => {
                println!("❌ Failed to open stores");
                println!("   Error: {e}");
                return Ok(4);
            }
        };

        let project = match metadata.get_project(&project_id).await {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Failed to load project {project_id}");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        println!("Project: {} ({})", project.name, project.id);
        println!("Storage prefix: {}", project.storage_prefix);
        println!();

        if project.archive_parts.is_empty() {
            println!("No archives recorded.");
            println!("Run 'keepsake export --project {project_id}' to create them.");
            return Ok(0);
        }

        println!(
            "{:<6} {:<12} {:<60} {:>14} {:>8} {:>8} {:<20}",
            "Part", "Status", "Key", "Bytes", "Images", "Skipped", "Created"
        );
        println!("{}", "-".repeat(134));

        for part in &project.archive_parts {
            let status = match part.status {
                ArchiveStatus::Complete => "✅ Complete",
                ArchiveStatus::Failed => "❌ Failed",
            };
            println!(
                "{:<6} {:<12} {:<60} {:>14} {:>8} {:>8} {:<20}",
                part.part_number,
                status,
                part.key.as_str(),
                part.size_bytes,
                part.image_count,
                part.failed_count,
                part.created_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        println!();

        let failed = project
            .archive_parts
            .iter()
            .filter(|p| !p.is_complete())
            .count();
        Ok(if failed > 0 { 1 } else { 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArchivePart, Project, StorageKey};
    use chrono::Utc;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir) -> String {
        let blobs = dir.path().join("blobs");
        let metadata = dir.path().join("metadata");
        std::fs::create_dir_all(&blobs).unwrap();
        std::fs::create_dir_all(metadata.join("projects")).unwrap();
        let path = dir.path().join("keepsake.toml");
        std::fs::write(
            &path,
            format!(
                "[storage]\nblob_root = \"{}\"\nmetadata_root = \"{}\"\n",
                blobs.display(),
                metadata.display()
            ),
        )
        .unwrap();
        path.display().to_string()
    }

    #[tokio::test]
    async fn test_status_reports_failed_parts() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir);

        let mut project = Project::new(ProjectId::new("trip").unwrap(), "Trip", "projects/trip");
        project.archive_parts.push(ArchivePart::failed(
            1,
            StorageKey::new("projects/trip/archives/trip_20240601.zip").unwrap(),
            3,
            Utc::now(),
        ));
        std::fs::write(
            dir.path().join("metadata/projects/trip.json"),
            serde_json::to_vec(&project).unwrap(),
        )
        .unwrap();

        let args = StatusArgs {
            project: "trip".to_string(),
        };
        assert_eq!(args.execute(&config_path).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_status_unknown_project() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir);
        let args = StatusArgs {
            project: "ghost".to_string(),
        };
        assert_eq!(args.execute(&config_path).await.unwrap(), 5);
    }
}
