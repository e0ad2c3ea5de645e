//! Store factory
//!
//! This module provides the factory function that builds the blob store and
//! metadata store from configuration.

use crate::adapters::filesystem::{FsBlobStore, JsonMetadataStore};
use crate::adapters::store::traits::{BlobStore, MetadataStore};
use crate::config::schema::KeepsakeConfig;
use crate::domain::{KeepsakeError, Result};
use std::path::Path;
use std::sync::Arc;

/// Create the blob store and metadata store described by the configuration
///
/// # Arguments
///
/// * `config` - The Keepsake configuration
///
/// # Returns
///
/// Returns Arc-wrapped trait objects for both stores
///
/// # Errors
///
/// Returns a configuration error if either root directory does not exist
pub async fn create_stores(
    config: &KeepsakeConfig,
) -> Result<(Arc<dyn BlobStore>, Arc<dyn MetadataStore>)> {
    let blob_root = Path::new(&config.storage.blob_root);
    let metadata_root = Path::new(&config.storage.metadata_root);

    ensure_directory("storage.blob_root", blob_root).await?;
    ensure_directory("storage.metadata_root", metadata_root).await?;

    tracing::info!(
        blob_root = %blob_root.display(),
        metadata_root = %metadata_root.display(),
        "Creating filesystem stores"
    );

    let blobs = Arc::new(FsBlobStore::new(blob_root)) as Arc<dyn BlobStore>;
    let metadata = Arc::new(JsonMetadataStore::new(metadata_root)) as Arc<dyn MetadataStore>;
    Ok((blobs, metadata))
}

async fn ensure_directory(name: &str, path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(KeepsakeError::Configuration(format!(
            "{name} is not a directory: {}",
            path.display()
        ))),
        Err(e) => Err(KeepsakeError::Configuration(format!(
            "{name} cannot be opened ({}): {e}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(blob_root: &Path, metadata_root: &Path) -> KeepsakeConfig {
        let mut config = KeepsakeConfig::default();
        config.storage.blob_root = blob_root.display().to_string();
        config.storage.metadata_root = metadata_root.display().to_string();
        config
    }

    #[tokio::test]
    async fn test_create_stores() {
        let blobs = TempDir::new().unwrap();
        let metadata = TempDir::new().unwrap();
        let result = create_stores(&config(blobs.path(), metadata.path())).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_root_is_configuration_error() {
        let metadata = TempDir::new().unwrap();
        let missing = metadata.path().join("does-not-exist");
        let err = create_stores(&config(&missing, metadata.path()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, KeepsakeError::Configuration(_)));
        assert!(err.to_string().contains("storage.blob_root"));
    }
}
