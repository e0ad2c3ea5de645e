//! Project and archive part domain models
//!
//! A [`Project`] is a named collection of images. Each export run produces
//! one [`ArchivePart`] per batch; the run's list replaces the project's
//! previous list in a single update.

use super::ids::{ProjectId, StorageKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named image collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project identifier
    pub id: ProjectId,

    /// Display name
    pub name: String,

    /// Storage-path prefix for the project's objects
    pub storage_prefix: String,

    /// Archive parts produced by the latest export run
    #[serde(default)]
    pub archive_parts: Vec<ArchivePart>,
}

impl Project {
    /// Creates a project with no archive parts
    pub fn new(id: ProjectId, name: impl Into<String>, storage_prefix: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            storage_prefix: storage_prefix.into(),
            archive_parts: Vec::new(),
        }
    }
}

/// Outcome of producing one archive part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveStatus {
    /// Archive was assembled and uploaded
    Complete,
    /// Assembly or upload failed
    Failed,
}

impl fmt::Display for ArchiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveStatus::Complete => write!(f, "complete"),
            ArchiveStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One physical archive file produced by one export run
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivePart {
    /// 1-based position of the part within its run
    pub part_number: usize,

    /// Storage key of the archive
    pub key: StorageKey,

    /// Archive size in bytes (0 when failed)
    pub size_bytes: u64,

    /// Images whose primary file was included; the batch's image count when failed
    pub image_count: usize,

    /// Files skipped because they could not be fetched
    #[serde(default)]
    pub failed_count: usize,

    /// Hex SHA-256 of the archive bytes (complete parts only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Part status
    pub status: ArchiveStatus,
}

impl ArchivePart {
    /// Record for an archive that was uploaded
    pub fn complete(
        part_number: usize,
        key: StorageKey,
        size_bytes: u64,
        image_count: usize,
        failed_count: usize,
        checksum: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            part_number,
            key,
            size_bytes,
            image_count,
            failed_count,
            checksum: Some(checksum),
            created_at,
            status: ArchiveStatus::Complete,
        }
    }

    /// Record for a batch whose archive could not be produced
    pub fn failed(
        part_number: usize,
        key: StorageKey,
        batch_image_count: usize,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            part_number,
            key,
            size_bytes: 0,
            image_count: batch_image_count,
            failed_count: 0,
            checksum: None,
            created_at,
            status: ArchiveStatus::Failed,
        }
    }

    /// Returns true if the part was produced
    pub fn is_complete(&self) -> bool {
        self.status == ArchiveStatus::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> StorageKey {
        StorageKey::new("p/archives/sw_2024-06-01.zip").unwrap()
    }

    #[test]
    fn test_failed_part_has_zero_size() {
        let part = ArchivePart::failed(2, key(), 7, Utc::now());
        assert_eq!(part.size_bytes, 0);
        assert_eq!(part.image_count, 7);
        assert_eq!(part.status, ArchiveStatus::Failed);
        assert!(part.checksum.is_none());
        assert!(!part.is_complete());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ArchiveStatus::Complete).unwrap();
        assert_eq!(json, "\"complete\"");
        let status: ArchiveStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(status, ArchiveStatus::Failed);
    }

    #[test]
    fn test_project_round_trips_through_json() {
        let mut project = Project::new(ProjectId::new("p1").unwrap(), "South-West", "p");
        project.archive_parts.push(ArchivePart::complete(
            1,
            key(),
            2048,
            3,
            0,
            "ab".repeat(32),
            Utc::now(),
        ));
        let json = serde_json::to_string(&project).unwrap();
        let decoded: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, project);
    }
}
