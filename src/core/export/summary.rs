//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.
//! A completed run always yields a summary listing every archive part, even
//! when every part failed.

use crate::domain::ids::ProjectId;
use crate::domain::project::{ArchivePart, ArchiveStatus};
use std::time::Duration;
use uuid::Uuid;

/// Summary of an export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Identifier of this run
    pub run_id: Uuid,

    /// Exported project
    pub project_id: ProjectId,

    /// Number of images found for the project
    pub total_images: usize,

    /// Number of batches planned
    pub total_batches: usize,

    /// Files added to archives
    pub successful_entries: usize,

    /// Files skipped because they could not be read
    pub failed_entries: usize,

    /// Archive parts in batch order
    pub parts: Vec<ArchivePart>,

    /// Duration of the export
    pub duration: Duration,

    /// Errors and warnings encountered during export
    pub errors: Vec<ExportError>,

    /// The project had no images; nothing was exported
    pub empty: bool,

    /// Dry run: archives were built but not uploaded or recorded
    pub dry_run: bool,

    /// A shutdown signal stopped the run before every batch started
    pub interrupted: bool,

    /// The part list was written back to the project
    pub persisted: bool,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            project_id,
            total_images: 0,
            total_batches: 0,
            successful_entries: 0,
            failed_entries: 0,
            parts: Vec::new(),
            duration: Duration::from_secs(0),
            errors: Vec::new(),
            empty: false,
            dry_run: false,
            interrupted: false,
            persisted: false,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Parts that were produced
    pub fn complete_parts(&self) -> impl Iterator<Item = &ArchivePart> {
        self.parts
            .iter()
            .filter(|p| p.status == ArchiveStatus::Complete)
    }

    /// Parts that failed
    pub fn failed_parts(&self) -> impl Iterator<Item = &ArchivePart> {
        self.parts
            .iter()
            .filter(|p| p.status == ArchiveStatus::Failed)
    }

    /// Total bytes across produced archives
    pub fn total_archive_bytes(&self) -> u64 {
        self.complete_parts().map(|p| p.size_bytes).sum()
    }

    /// Check if the export was fully successful
    ///
    /// Embedding fallbacks are warnings and do not count against success.
    pub fn is_successful(&self) -> bool {
        self.failed_entries == 0
            && self.failed_parts().count() == 0
            && !self.interrupted
            && self
                .errors
                .iter()
                .all(|e| e.error_type == ExportErrorType::Embed)
    }

    /// Get entry success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.successful_entries + self.failed_entries;
        if total == 0 {
            return 100.0;
        }
        (self.successful_entries as f64 / total as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            project_id = %self.project_id,
            total_images = self.total_images,
            total_batches = self.total_batches,
            complete_parts = self.complete_parts().count(),
            failed_parts = self.failed_parts().count(),
            successful_entries = self.successful_entries,
            failed_entries = self.failed_entries,
            archive_bytes = self.total_archive_bytes(),
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            dry_run = self.dry_run,
            interrupted = self.interrupted,
            "Export completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = error.context.as_deref().unwrap_or(""),
                    "Export error"
                );
            }
        }
    }
}

/// Type of export error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorType {
    /// A file could not be fetched; the entry was skipped
    Fetch,
    /// Metadata could not be embedded; the original bytes were used
    Embed,
    /// The archive for a batch could not be written
    Archive,
    /// The archive for a batch could not be uploaded
    Upload,
    /// The part list could not be written back to the project
    Persist,
    /// Anything else
    Unknown,
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g., storage key, part number)
    pub context: Option<String>,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
