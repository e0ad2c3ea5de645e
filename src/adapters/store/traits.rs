//! Store abstraction traits
//!
//! This module defines the traits that storage adapters must implement
//! to work with the export engine. Timeouts and transport-level retries
//! belong to the implementations; callers treat every call as fallible.

use crate::domain::ids::{ProjectId, StorageKey};
use crate::domain::image::ImageRecord;
use crate::domain::project::{ArchivePart, Project};
use crate::domain::Result;
use async_trait::async_trait;

/// Object store holding originals, related files and archives
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch an object's bytes
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the object does not exist, or
    /// another storage error if it cannot be read.
    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>>;

    /// Store an object, replacing any existing one
    ///
    /// # Errors
    ///
    /// Returns a storage error if the object cannot be written.
    async fn put(&self, key: &StorageKey, bytes: &[u8], content_type: &str) -> Result<()>;

    /// Check whether an object exists
    async fn exists(&self, key: &StorageKey) -> Result<bool>;
}

/// Metadata table holding projects and image records
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Load a project
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProjectNotFound` if the project does not exist.
    async fn get_project(&self, id: &ProjectId) -> Result<Project>;

    /// Load a project's images in stored order
    async fn query_images(&self, project_id: &ProjectId) -> Result<Vec<ImageRecord>>;

    /// Replace a project's archive part list in one update
    async fn update_project_archive_parts(
        &self,
        id: &ProjectId,
        parts: Vec<ArchivePart>,
    ) -> Result<()>;
}
