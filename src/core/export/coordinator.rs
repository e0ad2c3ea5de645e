//! Export coordinator - main orchestrator for one project export
//!
//! This module runs the export state machine: load the project and its
//! images, plan batches, assemble and upload one archive per batch, then
//! write the resulting part list back to the project in a single update.

use crate::adapters::store::factory::create_stores;
use crate::adapters::store::traits::{BlobStore, MetadataStore};
use crate::config::schema::ExportConfig;
use crate::config::KeepsakeConfig;
use crate::core::export::assembler::{ArchiveAssembler, AssembledArchive};
use crate::core::export::naming::{ArchiveNaming, ARCHIVE_CONTENT_TYPE};
use crate::core::export::planner::{Batch, BatchPlanner};
use crate::core::export::summary::{ExportError, ExportErrorType, ExportSummary};
use crate::domain::ids::{ProjectId, StorageKey};
use crate::domain::project::{ArchivePart, Project};
use crate::domain::{KeepsakeError, Result};
use crate::{log_error_with_context, log_retry_attempt};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Result of processing one batch
#[derive(Debug)]
struct BatchOutcome {
    part: ArchivePart,
    success_count: usize,
    fail_count: usize,
    issues: Vec<ExportError>,
}

/// Export coordinator
pub struct ExportCoordinator {
    settings: ExportConfig,
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    /// Shutdown signal receiver for graceful shutdown
    shutdown_signal: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a new export coordinator with stores built from configuration
    ///
    /// `application.dry_run` and `export.dry_run` both enable dry-run mode.
    pub async fn new(config: KeepsakeConfig, shutdown_signal: watch::Receiver<bool>) -> Result<Self> {
        let (blobs, metadata) = create_stores(&config).await?;

        let mut settings = config.export;
        settings.dry_run |= config.application.dry_run;

        Ok(Self::with_stores(settings, blobs, metadata, shutdown_signal))
    }

    /// Create a coordinator over existing stores
    pub fn with_stores(
        settings: ExportConfig,
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            settings,
            blobs,
            metadata,
            shutdown_signal,
        }
    }

    /// Export settings in effect
    pub fn settings(&self) -> &ExportConfig {
        &self.settings
    }

    /// Export a project, dating its archives with the current day
    ///
    /// # Errors
    ///
    /// Returns [`KeepsakeError::Load`] if the project or its image list
    /// cannot be loaded. Every other failure is recorded in the summary.
    pub async fn execute_export(&self, project_id: &ProjectId) -> Result<ExportSummary> {
        self.execute_export_at(project_id, Utc::now()).await
    }

    /// Export a project as if the run started at `run_started`
    ///
    /// The run date appears in archive keys; every other timestamp is taken
    /// from the clock as parts are produced.
    pub async fn execute_export_at(
        &self,
        project_id: &ProjectId,
        run_started: DateTime<Utc>,
    ) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new(project_id.clone());
        summary.dry_run = self.settings.dry_run;

        tracing::info!(
            run_id = %summary.run_id,
            project_id = %project_id,
            dry_run = summary.dry_run,
            "Starting export"
        );

        let project = self
            .metadata
            .get_project(project_id)
            .await
            .map_err(|e| self.load_failed(project_id, "project", e))?;

        let images = self
            .metadata
            .query_images(project_id)
            .await
            .map_err(|e| self.load_failed(project_id, "image list", e))?;

        summary.total_images = images.len();
        if images.is_empty() {
            tracing::info!(project_id = %project_id, "Project has no images, nothing to export");
            summary.empty = true;
            return Ok(summary.with_duration(start_time.elapsed()));
        }

        let batches = BatchPlanner::new(self.settings.max_archive_bytes).plan(images);
        summary.total_batches = batches.len();

        let naming = ArchiveNaming::new(
            &project.storage_prefix,
            &self.settings.archive_dir,
            &project.name,
            self.settings.max_name_length,
            run_started.date_naive(),
            batches.len(),
        );
        let keys = (1..=batches.len())
            .map(|part_number| naming.key_for(part_number))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            project_id = %project_id,
            total_images = summary.total_images,
            batch_count = batches.len(),
            archive_name = naming.base_name(),
            "Planned export"
        );

        let catalog_key = self.find_catalog(&project).await;
        let assembler = ArchiveAssembler::new(self.blobs.clone());

        let outcomes: Vec<Option<BatchOutcome>> = stream::iter(batches.iter().zip(keys).enumerate())
            .map(|(index, (batch, key))| {
                self.process_batch(
                    &assembler,
                    &project,
                    catalog_key.as_ref(),
                    index + 1,
                    key,
                    batch,
                )
            })
            .buffered(self.settings.parallel_batches.max(1))
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                Some(outcome) => {
                    summary.successful_entries += outcome.success_count;
                    summary.failed_entries += outcome.fail_count;
                    summary.errors.extend(outcome.issues);
                    summary.parts.push(outcome.part);
                }
                None => summary.interrupted = true,
            }
        }

        if summary.interrupted {
            tracing::warn!(
                project_id = %project_id,
                produced = summary.parts.len(),
                planned = summary.total_batches,
                "Export interrupted before all batches started"
            );
        }

        self.persist_parts(&mut summary).await;

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    fn load_failed(&self, project_id: &ProjectId, what: &str, error: KeepsakeError) -> KeepsakeError {
        log_error_with_context!(&error, format!("loading {what} for project {project_id}"));
        KeepsakeError::Load(format!("{what} for project {project_id}: {error}"))
    }

    /// Key of the project catalog, if the project has one
    async fn find_catalog(&self, project: &Project) -> Option<StorageKey> {
        let key = StorageKey::join(&project.storage_prefix, &self.settings.catalog_file_name).ok()?;
        match self.blobs.exists(&key).await {
            Ok(true) => {
                tracing::debug!(key = %key, "Including project catalog");
                Some(key)
            }
            Ok(false) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Could not check for project catalog");
                None
            }
        }
    }

    /// Assemble and upload one batch
    ///
    /// Returns `None` when a shutdown was requested before the batch started.
    async fn process_batch(
        &self,
        assembler: &ArchiveAssembler,
        project: &Project,
        catalog_key: Option<&StorageKey>,
        part_number: usize,
        key: StorageKey,
        batch: &Batch,
    ) -> Option<BatchOutcome> {
        if *self.shutdown_signal.borrow() {
            tracing::warn!(part = part_number, "Shutdown requested, skipping batch");
            return None;
        }

        tracing::info!(
            part = part_number,
            images = batch.len(),
            batch_bytes = batch.total_bytes(),
            key = %key,
            "Assembling archive"
        );

        let assembled = match assembler.assemble(batch, &project.name, catalog_key).await {
            Ok(assembled) => assembled,
            Err(e) => {
                tracing::error!(part = part_number, error = %e, "Failed to assemble archive");
                let issue = ExportError::new(ExportErrorType::Archive, e.to_string())
                    .with_context(format!("part={part_number}"));
                return Some(Self::failed_outcome(part_number, key, batch, 0, vec![issue]));
            }
        };

        let AssembledArchive {
            bytes,
            included_images,
            success_count,
            fail_count,
            mut issues,
            ..
        } = assembled;

        if success_count == 0 && fail_count > 0 {
            tracing::error!(part = part_number, "No file in the batch could be read");
            issues.push(
                ExportError::new(ExportErrorType::Archive, "no file in the batch could be read")
                    .with_context(format!("part={part_number}")),
            );
            return Some(Self::failed_outcome(part_number, key, batch, fail_count, issues));
        }

        if self.settings.dry_run {
            tracing::info!(part = part_number, key = %key, size_bytes = bytes.len(), "Dry run, skipping upload");
        } else if let Err(e) = self.upload_with_retry(&key, &bytes).await {
            tracing::error!(part = part_number, key = %key, error = %e, "Failed to upload archive");
            issues.push(
                ExportError::new(ExportErrorType::Upload, e.to_string())
                    .with_context(format!("part={part_number}, key={key}")),
            );
            return Some(Self::failed_outcome(part_number, key, batch, fail_count, issues));
        }

        let part = ArchivePart::complete(
            part_number,
            key,
            bytes.len() as u64,
            included_images,
            fail_count,
            sha256_hex(&bytes),
            Utc::now(),
        );

        tracing::info!(
            part = part_number,
            key = %part.key,
            size_bytes = part.size_bytes,
            included_images,
            success_count,
            fail_count,
            "Archive part complete"
        );

        Some(BatchOutcome {
            part,
            success_count,
            fail_count,
            issues,
        })
    }

    fn failed_outcome(
        part_number: usize,
        key: StorageKey,
        batch: &Batch,
        fail_count: usize,
        issues: Vec<ExportError>,
    ) -> BatchOutcome {
        BatchOutcome {
            part: ArchivePart::failed(part_number, key, batch.len(), Utc::now()),
            success_count: 0,
            fail_count,
            issues,
        }
    }

    /// Upload archive bytes, retrying with the configured backoff
    async fn upload_with_retry(&self, key: &StorageKey, bytes: &[u8]) -> Result<()> {
        let max_attempts = self.settings.upload_max_retries + 1;
        let mut attempt = 1;
        loop {
            match self.blobs.put(key, bytes, ARCHIVE_CONTENT_TYPE).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < max_attempts => {
                    log_retry_attempt!(attempt, max_attempts, e.to_string());
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Delay before the retry following `attempt`; the last entry repeats
    fn backoff(&self, attempt: u32) -> Duration {
        let delays = &self.settings.retry_backoff_ms;
        let index = (attempt as usize).saturating_sub(1);
        let ms = delays.get(index).or(delays.last()).copied().unwrap_or(0);
        Duration::from_millis(ms)
    }

    /// Replace the project's part list with this run's parts
    async fn persist_parts(&self, summary: &mut ExportSummary) {
        if self.settings.dry_run {
            tracing::info!(project_id = %summary.project_id, "Dry run, not recording archive parts");
            return;
        }
        if summary.parts.is_empty() {
            tracing::warn!(project_id = %summary.project_id, "No archive parts produced, keeping previous list");
            return;
        }

        match self
            .metadata
            .update_project_archive_parts(&summary.project_id, summary.parts.clone())
            .await
        {
            Ok(()) => {
                summary.persisted = true;
                tracing::info!(
                    project_id = %summary.project_id,
                    parts = summary.parts.len(),
                    "Recorded archive parts"
                );
            }
            Err(e) => {
                tracing::error!(project_id = %summary.project_id, error = %e, "Failed to record archive parts");
                summary.add_error(
                    ExportError::new(ExportErrorType::Persist, e.to_string())
                        .with_context(format!("project_id={}", summary.project_id)),
                );
            }
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("{result:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryBlobStore, InMemoryMetadataStore};
    use crate::domain::image::ImageRecord;
    use crate::domain::ArchiveStatus;
    use chrono::TimeZone;

    struct Fixture {
        blobs: Arc<InMemoryBlobStore>,
        metadata: Arc<InMemoryMetadataStore>,
        project_id: ProjectId,
    }

    fn settings() -> ExportConfig {
        ExportConfig {
            retry_backoff_ms: vec![0],
            ..ExportConfig::default()
        }
    }

    fn fixture(files: &[(&str, u64)]) -> Fixture {
        let blobs = Arc::new(InMemoryBlobStore::new());
        let metadata = Arc::new(InMemoryMetadataStore::new());
        let project_id = ProjectId::new("trip").unwrap();
        metadata.insert_project(Project::new(project_id.clone(), "Summer Trip", "projects/trip"));

        let images = files
            .iter()
            .enumerate()
            .map(|(i, (name, size))| {
                let key = format!("projects/trip/{name}");
                blobs.insert(StorageKey::new(key.clone()).unwrap(), name.as_bytes().to_vec());
                ImageRecord::builder()
                    .id(format!("img{i}"))
                    .unwrap()
                    .primary_key(key)
                    .unwrap()
                    .size_bytes(*size)
                    .build()
                    .unwrap()
            })
            .collect();
        metadata.insert_images(project_id.clone(), images);

        Fixture {
            blobs,
            metadata,
            project_id,
        }
    }

    fn coordinator(f: &Fixture, settings: ExportConfig) -> (ExportCoordinator, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let coordinator = ExportCoordinator::with_stores(settings, f.blobs.clone(), f.metadata.clone(), rx);
        (coordinator, tx)
    }

    fn run_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_single_part_export() {
        let f = fixture(&[("a.png", 10), ("b.png", 10)]);
        let (coordinator, _tx) = coordinator(&f, settings());

        let summary = coordinator.execute_export_at(&f.project_id, run_date()).await.unwrap();

        assert_eq!(summary.parts.len(), 1);
        let part = &summary.parts[0];
        assert_eq!(part.key.as_str(), "projects/trip/archives/summer_trip_20240601.zip");
        assert_eq!(part.status, ArchiveStatus::Complete);
        assert_eq!(part.image_count, 2);
        assert_eq!(part.checksum.as_ref().map(String::len), Some(64));
        assert!(summary.persisted);
        assert!(summary.is_successful());
        assert_eq!(f.blobs.content_type(&part.key).as_deref(), Some("application/zip"));
        assert_eq!(f.metadata.project(&f.project_id).unwrap().archive_parts, summary.parts);
    }

    #[tokio::test]
    async fn test_part_counts_images_not_files() {
        let f = fixture(&[]);
        f.blobs.insert(StorageKey::new("projects/trip/a.jpg").unwrap(), b"jpeg".to_vec());
        f.blobs.insert(StorageKey::new("projects/trip/a.cr2").unwrap(), b"raw".to_vec());
        let image = ImageRecord::builder()
            .id("a")
            .unwrap()
            .primary_key("projects/trip/a.jpg")
            .unwrap()
            .related_key("projects/trip/a.cr2")
            .unwrap()
            .size_bytes(10)
            .build()
            .unwrap();
        f.metadata.insert_images(f.project_id.clone(), vec![image]);
        let (coordinator, _tx) = coordinator(&f, settings());

        let summary = coordinator.execute_export_at(&f.project_id, run_date()).await.unwrap();

        let part = &summary.parts[0];
        assert_eq!(part.status, ArchiveStatus::Complete);
        assert_eq!(part.image_count, 1);
        assert_eq!(part.failed_count, 0);
        assert_eq!(summary.successful_entries, 2);
    }

    #[tokio::test]
    async fn test_upload_retry_recovers() {
        let f = fixture(&[("a.png", 10)]);
        f.blobs.fail_next_puts(2);
        let (coordinator, _tx) = coordinator(&f, settings());

        let summary = coordinator.execute_export_at(&f.project_id, run_date()).await.unwrap();

        assert_eq!(summary.parts[0].status, ArchiveStatus::Complete);
        assert_eq!(f.blobs.put_attempts(), 3);
    }

    #[tokio::test]
    async fn test_upload_retries_exhausted() {
        let f = fixture(&[("a.png", 10)]);
        f.blobs.fail_next_puts(10);
        let settings = ExportConfig {
            upload_max_retries: 1,
            ..settings()
        };
        let (coordinator, _tx) = coordinator(&f, settings);

        let summary = coordinator.execute_export_at(&f.project_id, run_date()).await.unwrap();

        assert_eq!(f.blobs.put_attempts(), 2);
        let part = &summary.parts[0];
        assert_eq!(part.status, ArchiveStatus::Failed);
        assert_eq!(part.size_bytes, 0);
        assert_eq!(part.image_count, 1);
        assert!(summary
            .errors
            .iter()
            .any(|e| e.error_type == ExportErrorType::Upload));
        assert!(summary.persisted);
    }

    #[tokio::test]
    async fn test_all_entries_missing_marks_part_failed() {
        let f = fixture(&[("a.png", 10)]);
        f.blobs.fail_get(StorageKey::new("projects/trip/a.png").unwrap());
        let (coordinator, _tx) = coordinator(&f, settings());

        let summary = coordinator.execute_export_at(&f.project_id, run_date()).await.unwrap();

        assert_eq!(summary.parts[0].status, ArchiveStatus::Failed);
        assert_eq!(summary.failed_entries, 1);
        assert_eq!(f.blobs.put_attempts(), 0);
    }

    #[tokio::test]
    async fn test_persist_failure_is_reported() {
        let f = fixture(&[("a.png", 10)]);
        f.metadata.fail_updates(true);
        let (coordinator, _tx) = coordinator(&f, settings());

        let summary = coordinator.execute_export_at(&f.project_id, run_date()).await.unwrap();

        assert!(!summary.persisted);
        assert_eq!(summary.parts.len(), 1);
        assert!(summary
            .errors
            .iter()
            .any(|e| e.error_type == ExportErrorType::Persist));
    }

    #[tokio::test]
    async fn test_shutdown_before_start_skips_batches() {
        let f = fixture(&[("a.png", 10), ("b.png", 10)]);
        let settings = ExportConfig {
            max_archive_bytes: 10,
            ..settings()
        };
        let (coordinator, tx) = coordinator(&f, settings);
        tx.send(true).unwrap();

        let summary = coordinator.execute_export_at(&f.project_id, run_date()).await.unwrap();

        assert!(summary.interrupted);
        assert!(summary.parts.is_empty());
        assert_eq!(summary.total_batches, 2);
        assert!(!summary.persisted);
        assert_eq!(f.metadata.update_count(), 0);
    }

    #[tokio::test]
    async fn test_parallel_batches_keep_order() {
        let f = fixture(&[("a.png", 10), ("b.png", 10), ("c.png", 10), ("d.png", 10)]);
        let settings = ExportConfig {
            max_archive_bytes: 10,
            parallel_batches: 3,
            ..settings()
        };
        let (coordinator, _tx) = coordinator(&f, settings);

        let summary = coordinator.execute_export_at(&f.project_id, run_date()).await.unwrap();

        let numbers: Vec<usize> = summary.parts.iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(
            summary.parts[3].key.as_str(),
            "projects/trip/archives/summer_trip_20240601_part4.zip"
        );
    }

    #[tokio::test]
    async fn test_load_failures_name_what_was_missing() {
        let f = fixture(&[("a.png", 10)]);
        let (coordinator, _tx) = coordinator(&f, settings());

        let err = coordinator
            .execute_export_at(&ProjectId::new("ghost").unwrap(), run_date())
            .await
            .unwrap_err();
        assert!(matches!(err, KeepsakeError::Load(_)));
        assert!(err.to_string().contains("project for project ghost"));

        f.metadata.fail_queries(true);
        let err = coordinator
            .execute_export_at(&f.project_id, run_date())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("image list for project trip"));
        assert_eq!(f.metadata.update_count(), 0);
    }

    #[test]
    fn test_backoff_repeats_last_delay() {
        let f = fixture(&[]);
        let settings = ExportConfig {
            retry_backoff_ms: vec![100, 200],
            ..ExportConfig::default()
        };
        let (coordinator, _tx) = coordinator(&f, settings);
        assert_eq!(coordinator.backoff(1), Duration::from_millis(100));
        assert_eq!(coordinator.backoff(2), Duration::from_millis(200));
        assert_eq!(coordinator.backoff(5), Duration::from_millis(200));
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
