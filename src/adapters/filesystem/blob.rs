//! Filesystem blob store
//!
//! Maps storage keys onto paths under a root directory. Writes go to a
//! temporary sibling file that is renamed into place, so readers never see
//! a partially written archive.

use crate::adapters::store::traits::BlobStore;
use crate::domain::errors::StorageError;
use crate::domain::ids::StorageKey;
use crate::domain::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Blob store backed by a local directory
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a key to a path, refusing keys that would escape the root
    fn path_for(&self, key: &StorageKey) -> std::result::Result<PathBuf, StorageError> {
        let mut path = self.root.clone();
        for segment in key.as_str().split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(StorageError::InvalidKey(key.to_string()));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()).into())
            }
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    async fn put(&self, key: &StorageKey, bytes: &[u8], content_type: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let write_failed = |e: std::io::Error| StorageError::WriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(write_failed)?;
        }

        let temp_path = path.with_file_name(format!(
            ".{}.{}.partial",
            key.file_name(),
            Uuid::new_v4().simple()
        ));

        if let Err(e) = tokio::fs::write(&temp_path, bytes).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(write_failed(e).into());
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(write_failed(e).into());
        }

        tracing::debug!(
            key = %key,
            content_type = content_type,
            size_bytes = bytes.len(),
            "Stored object"
        );
        Ok(())
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool> {
        let path = self.path_for(key)?;
        tokio::fs::try_exists(&path).await.map_err(|e| {
            StorageError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}
