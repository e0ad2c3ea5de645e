//! In-memory store backends
//!
//! Used by tests and dry runs. Both stores support fault injection so the
//! export coordinator's error paths can be exercised.

use crate::adapters::store::traits::{BlobStore, MetadataStore};
use crate::domain::errors::{CatalogError, StorageError};
use crate::domain::ids::{ProjectId, StorageKey};
use crate::domain::image::ImageRecord;
use crate::domain::project::{ArchivePart, Project};
use crate::domain::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct BlobState {
    objects: BTreeMap<StorageKey, (Vec<u8>, String)>,
    failing_gets: HashSet<StorageKey>,
    failing_puts: usize,
    put_attempts: usize,
}

/// Blob store holding objects in a map
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    state: Mutex<BlobState>,
}

impl InMemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object directly
    pub fn insert(&self, key: StorageKey, bytes: impl Into<Vec<u8>>) {
        lock(&self.state)
            .objects
            .insert(key, (bytes.into(), "application/octet-stream".to_string()));
    }

    /// Make every read of `key` fail
    pub fn fail_get(&self, key: StorageKey) {
        lock(&self.state).failing_gets.insert(key);
    }

    /// Make the next `count` writes fail
    pub fn fail_next_puts(&self, count: usize) {
        lock(&self.state).failing_puts = count;
    }

    /// Bytes stored under `key`
    pub fn object(&self, key: &StorageKey) -> Option<Vec<u8>> {
        lock(&self.state).objects.get(key).map(|(b, _)| b.clone())
    }

    /// Content type recorded for `key`
    pub fn content_type(&self, key: &StorageKey) -> Option<String> {
        lock(&self.state).objects.get(key).map(|(_, c)| c.clone())
    }

    /// All stored keys in order
    pub fn keys(&self) -> Vec<StorageKey> {
        lock(&self.state).objects.keys().cloned().collect()
    }

    /// Number of write attempts, failed ones included
    pub fn put_attempts(&self) -> usize {
        lock(&self.state).put_attempts
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>> {
        let state = lock(&self.state);
        if state.failing_gets.contains(key) {
            return Err(StorageError::ReadFailed {
                key: key.to_string(),
                message: "injected read failure".to_string(),
            }
            .into());
        }
        state
            .objects
            .get(key)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()).into())
    }

    async fn put(&self, key: &StorageKey, bytes: &[u8], content_type: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.put_attempts += 1;
        if state.failing_puts > 0 {
            state.failing_puts -= 1;
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                message: "injected write failure".to_string(),
            }
            .into());
        }
        state
            .objects
            .insert(key.clone(), (bytes.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool> {
        Ok(lock(&self.state).objects.contains_key(key))
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    projects: HashMap<ProjectId, Project>,
    images: HashMap<ProjectId, Vec<ImageRecord>>,
    failing_queries: bool,
    failing_updates: bool,
    update_count: usize,
}

/// Metadata store holding records in maps
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    state: Mutex<CatalogState>,
}

impl InMemoryMetadataStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a project
    pub fn insert_project(&self, project: Project) {
        lock(&self.state).projects.insert(project.id.clone(), project);
    }

    /// Set the image list of a project
    pub fn insert_images(&self, project_id: ProjectId, images: Vec<ImageRecord>) {
        lock(&self.state).images.insert(project_id, images);
    }

    /// Make image queries fail
    pub fn fail_queries(&self, fail: bool) {
        lock(&self.state).failing_queries = fail;
    }

    /// Make project updates fail
    pub fn fail_updates(&self, fail: bool) {
        lock(&self.state).failing_updates = fail;
    }

    /// Current project record
    pub fn project(&self, id: &ProjectId) -> Option<Project> {
        lock(&self.state).projects.get(id).cloned()
    }

    /// Number of successful part-list updates
    pub fn update_count(&self) -> usize {
        lock(&self.state).update_count
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn get_project(&self, id: &ProjectId) -> Result<Project> {
        lock(&self.state)
            .projects
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::ProjectNotFound(id.to_string()).into())
    }

    async fn query_images(&self, project_id: &ProjectId) -> Result<Vec<ImageRecord>> {
        let state = lock(&self.state);
        if state.failing_queries {
            return Err(CatalogError::QueryFailed("injected query failure".to_string()).into());
        }
        Ok(state.images.get(project_id).cloned().unwrap_or_default())
    }

    async fn update_project_archive_parts(
        &self,
        id: &ProjectId,
        parts: Vec<ArchivePart>,
    ) -> Result<()> {
        let mut state = lock(&self.state);
        if state.failing_updates {
            return Err(CatalogError::UpdateFailed {
                id: id.to_string(),
                message: "injected update failure".to_string(),
            }
            .into());
        }
        let project = state
            .projects
            .get_mut(id)
            .ok_or_else(|| CatalogError::ProjectNotFound(id.to_string()))?;
        project.archive_parts = parts;
        state.update_count += 1;
        Ok(())
    }
}
