//! End-to-end export against the filesystem stores
//!
//! Builds a blob tree and JSON metadata records in a temporary directory,
//! runs an export through configuration-built stores and inspects the files
//! left on disk.

use chrono::{TimeZone, Utc};
use keepsake::config::{KeepsakeConfig, StorageConfig};
use keepsake::core::export::ExportCoordinator;
use keepsake::domain::{ArchiveStatus, KeepsakeError, Project, ProjectId};
use serde_json::json;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use tokio::sync::watch;

fn write(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn seed(dir: &TempDir) -> KeepsakeConfig {
    let blob_root = dir.path().join("blobs");
    let metadata_root = dir.path().join("metadata");

    write(
        &blob_root.join("projects/sw/IMG_0001.jpg"),
        &[0xFF, 0xD8, 0xFF, 0xD9],
    );
    write(&blob_root.join("projects/sw/IMG_0002.NEF"), b"nikon raw");
    write(&blob_root.join("projects/sw/catalog.xmp"), b"<catalog/>");

    let project = json!({
        "id": "sw",
        "name": "South-West 2024!!",
        "storage_prefix": "projects/sw"
    });
    write(
        &metadata_root.join("projects/sw.json"),
        project.to_string().as_bytes(),
    );

    let images = json!([
        {
            "id": "img1",
            "primary_key": "projects/sw/IMG_0001.jpg",
            "size_bytes": 4,
            "rating": 3,
            "keywords": ["harbour"]
        },
        {
            "id": "img2",
            "primary_key": "projects/sw/IMG_0002.NEF",
            "size_bytes": 9,
            "group": 2
        }
    ]);
    write(
        &metadata_root.join("images/sw.json"),
        images.to_string().as_bytes(),
    );

    KeepsakeConfig {
        storage: StorageConfig {
            blob_root: blob_root.display().to_string(),
            metadata_root: metadata_root.display().to_string(),
        },
        ..KeepsakeConfig::default()
    }
}

#[tokio::test]
async fn test_export_writes_archive_and_records_parts() {
    let dir = TempDir::new().unwrap();
    let config = seed(&dir);
    let (_tx, rx) = watch::channel(false);
    let coordinator = ExportCoordinator::new(config, rx).await.unwrap();
    let project_id = ProjectId::new("sw").unwrap();

    let summary = coordinator
        .execute_export_at(&project_id, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        .await
        .unwrap();

    assert!(summary.is_successful());
    assert!(summary.persisted);
    assert_eq!(summary.parts.len(), 1);
    let part = &summary.parts[0];
    assert_eq!(
        part.key.as_str(),
        "projects/sw/archives/south_west_2024_20240601.zip"
    );

    let archive_path = dir.path().join("blobs").join(part.key.as_str());
    let bytes = fs::read(&archive_path).unwrap();
    assert_eq!(bytes.len() as u64, part.size_bytes);

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["catalog.xmp", "IMG_0001.jpg", "IMG_0002.NEF", "IMG_0002.xmp"]
    );

    let record = fs::read_to_string(dir.path().join("metadata/projects/sw.json")).unwrap();
    let stored: Project = serde_json::from_str(&record).unwrap();
    assert_eq!(stored.archive_parts, summary.parts);
    assert_eq!(stored.archive_parts[0].status, ArchiveStatus::Complete);
}

#[tokio::test]
async fn test_dry_run_leaves_disk_untouched() {
    let dir = TempDir::new().unwrap();
    let mut config = seed(&dir);
    config.application.dry_run = true;
    let (_tx, rx) = watch::channel(false);
    let coordinator = ExportCoordinator::new(config, rx).await.unwrap();
    assert!(coordinator.settings().dry_run);

    let summary = coordinator
        .execute_export(&ProjectId::new("sw").unwrap())
        .await
        .unwrap();

    assert_eq!(summary.parts.len(), 1);
    assert!(!dir.path().join("blobs/projects/sw/archives").exists());
    let record = fs::read_to_string(dir.path().join("metadata/projects/sw.json")).unwrap();
    let stored: Project = serde_json::from_str(&record).unwrap();
    assert!(stored.archive_parts.is_empty());
}

#[tokio::test]
async fn test_unknown_project_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let config = seed(&dir);
    let (_tx, rx) = watch::channel(false);
    let coordinator = ExportCoordinator::new(config, rx).await.unwrap();

    let result = coordinator
        .execute_export(&ProjectId::new("nope").unwrap())
        .await;

    assert!(matches!(result, Err(KeepsakeError::Load(_))));
}

#[tokio::test]
async fn test_missing_store_root_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let mut config = seed(&dir);
    config.storage.blob_root = dir.path().join("absent").display().to_string();
    let (_tx, rx) = watch::channel(false);

    let result = ExportCoordinator::new(config, rx).await;

    assert!(matches!(result, Err(KeepsakeError::Configuration(_))));
}
