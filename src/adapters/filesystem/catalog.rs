//! JSON-file metadata store
//!
//! Layout under the metadata root:
//!
//! ```text
//! projects/{project_id}.json   one Project record
//! images/{project_id}.json     array of ImageRecord (absent means no images)
//! ```

use crate::adapters::store::traits::MetadataStore;
use crate::domain::errors::CatalogError;
use crate::domain::ids::ProjectId;
use crate::domain::image::ImageRecord;
use crate::domain::project::{ArchivePart, Project};
use crate::domain::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const PROJECTS_DIR: &str = "projects";
const IMAGES_DIR: &str = "images";

/// Metadata store reading and writing JSON documents
#[derive(Debug)]
pub struct JsonMetadataStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonMetadataStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, dir: &str, id: &ProjectId) -> std::result::Result<PathBuf, CatalogError> {
        let id = id.as_str();
        if id.starts_with('.') || id.contains('/') || id.contains('\\') {
            return Err(CatalogError::QueryFailed(format!(
                "project id '{id}' cannot be used as a file name"
            )));
        }
        Ok(self.root.join(dir).join(format!("{id}.json")))
    }

    async fn read_project(&self, id: &ProjectId) -> std::result::Result<Project, CatalogError> {
        let path = self.record_path(PROJECTS_DIR, id)?;
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::ProjectNotFound(id.to_string()))
            }
            Err(e) => {
                return Err(CatalogError::QueryFailed(format!(
                    "{}: {e}",
                    path.display()
                )))
            }
        };

        serde_json::from_slice(&raw)
            .map_err(|e| CatalogError::CorruptRecord(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl MetadataStore for JsonMetadataStore {
    async fn get_project(&self, id: &ProjectId) -> Result<Project> {
        Ok(self.read_project(id).await?)
    }

    async fn query_images(&self, project_id: &ProjectId) -> Result<Vec<ImageRecord>> {
        let path = self.record_path(IMAGES_DIR, project_id)?;
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(project_id = %project_id, "No image records for project");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(
                    CatalogError::QueryFailed(format!("{}: {e}", path.display())).into(),
                )
            }
        };

        let images: Vec<ImageRecord> = serde_json::from_slice(&raw)
            .map_err(|e| CatalogError::CorruptRecord(format!("{}: {e}", path.display())))?;
        Ok(images)
    }

    async fn update_project_archive_parts(
        &self,
        id: &ProjectId,
        parts: Vec<ArchivePart>,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut project = self.read_project(id).await?;
        project.archive_parts = parts;

        let update_failed = |message: String| CatalogError::UpdateFailed {
            id: id.to_string(),
            message,
        };

        let path = self.record_path(PROJECTS_DIR, id)?;
        let json = serde_json::to_vec_pretty(&project).map_err(|e| update_failed(e.to_string()))?;
        let temp_path = path.with_extension("json.partial");

        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| update_failed(e.to_string()))?;
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(update_failed(e.to_string()).into());
        }

        tracing::debug!(
            project_id = %id,
            part_count = project.archive_parts.len(),
            "Updated project archive parts"
        );
        Ok(())
    }
}
