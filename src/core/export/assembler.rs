//! Archive assembly for one batch
//!
//! Streams a batch's files into an uncompressed zip held in memory. Curation
//! metadata is embedded into JPEG entries and written as `.xmp` sidecars next
//! to RAW entries. A file that cannot be fetched is skipped and counted; it
//! never aborts the batch.

use crate::adapters::store::traits::BlobStore;
use crate::core::export::allocator::FilenameAllocator;
use crate::core::export::planner::Batch;
use crate::core::export::summary::{ExportError, ExportErrorType};
use crate::core::metadata::format::{qualified_sidecar_name, sidecar_name, FileFormat};
use crate::core::metadata::{jpeg, xmp};
use crate::domain::ids::StorageKey;
use crate::domain::Result;
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Archive bytes plus per-entry accounting for one batch
#[derive(Debug, Clone, Default)]
pub struct AssembledArchive {
    /// Complete zip file
    pub bytes: Vec<u8>,

    /// Images whose primary file was added
    pub included_images: usize,

    /// Image and related files added
    pub success_count: usize,

    /// Image and related files skipped
    pub fail_count: usize,

    /// Entry names in archive order
    pub entries: Vec<String>,

    /// Skipped files and embedding fallbacks
    pub issues: Vec<ExportError>,
}

/// Zip writer over an in-memory buffer
///
/// Every entry is stored uncompressed with a fixed timestamp so identical
/// inputs produce identical archives.
struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl ArchiveWriter {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn add(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(DateTime::default())
            .large_file(bytes.len() as u64 >= u64::from(u32::MAX));

        self.zip.start_file(name.to_string(), options)?;
        self.zip.write_all(bytes)?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(self.zip.finish()?.into_inner())
    }
}

/// Builds the archive for one batch
pub struct ArchiveAssembler {
    blobs: Arc<dyn BlobStore>,
}

impl ArchiveAssembler {
    /// Create an assembler reading from the given blob store
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Assemble the archive for `batch`
    ///
    /// The project catalog, when given, is added first so it keeps its own
    /// name. Then every image contributes its primary file followed by its
    /// related files, each under a name from a per-batch [`FilenameAllocator`].
    ///
    /// # Errors
    ///
    /// Only a failure of the zip writer itself is returned; fetch failures
    /// and embedding fallbacks are reported through [`AssembledArchive`].
    pub async fn assemble(
        &self,
        batch: &Batch,
        project_name: &str,
        catalog_key: Option<&StorageKey>,
    ) -> Result<AssembledArchive> {
        let mut writer = ArchiveWriter::new();
        let mut names = FilenameAllocator::new();
        let mut archive = AssembledArchive::default();

        if let Some(key) = catalog_key {
            self.add_catalog(&mut writer, &mut names, &mut archive, key)
                .await?;
        }

        for image in batch.images() {
            let document = xmp::render(image, project_name);
            for (index, key) in image.all_keys().enumerate() {
                let added = self
                    .add_file(&mut writer, &mut names, &mut archive, key, &document)
                    .await?;
                if added && index == 0 {
                    archive.included_images += 1;
                }
            }
        }

        archive.bytes = writer.finish()?;

        tracing::debug!(
            entries = archive.entries.len(),
            included_images = archive.included_images,
            success_count = archive.success_count,
            fail_count = archive.fail_count,
            size_bytes = archive.bytes.len(),
            "Assembled archive"
        );

        Ok(archive)
    }

    async fn add_catalog(
        &self,
        writer: &mut ArchiveWriter,
        names: &mut FilenameAllocator,
        archive: &mut AssembledArchive,
        key: &StorageKey,
    ) -> Result<()> {
        match self.blobs.get(key).await {
            Ok(bytes) => {
                let name = names.allocate(key.file_name());
                writer.add(&name, &bytes)?;
                archive.entries.push(name);
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Project catalog could not be read");
                archive.issues.push(
                    ExportError::new(ExportErrorType::Fetch, e.to_string())
                        .with_context(format!("catalog={key}")),
                );
            }
        }
        Ok(())
    }

    async fn add_file(
        &self,
        writer: &mut ArchiveWriter,
        names: &mut FilenameAllocator,
        archive: &mut AssembledArchive,
        key: &StorageKey,
        document: &str,
    ) -> Result<bool> {
        let name = names.allocate(key.file_name());

        let bytes = match self.blobs.get(key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Skipping file that could not be fetched");
                archive.fail_count += 1;
                archive.issues.push(
                    ExportError::new(ExportErrorType::Fetch, e.to_string())
                        .with_context(format!("key={key}")),
                );
                return Ok(false);
            }
        };

        let format = FileFormat::of_file_name(&name);
        if format.is_embeddable() {
            let bytes = match jpeg::embed(&bytes, document) {
                Ok(embedded) => embedded,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Embedding failed, using original bytes");
                    archive.issues.push(
                        ExportError::new(ExportErrorType::Embed, e.to_string())
                            .with_context(format!("key={key}")),
                    );
                    bytes
                }
            };
            writer.add(&name, &bytes)?;
            archive.entries.push(name);
        } else {
            writer.add(&name, &bytes)?;
            archive.entries.push(name.clone());

            if format.supports_sidecar() {
                let preferred = sidecar_name(&name);
                let sidecar = if names.is_taken(&preferred) {
                    names.allocate(&qualified_sidecar_name(&name))
                } else {
                    names.allocate(&preferred)
                };
                writer.add(&sidecar, document.as_bytes())?;
                archive.entries.push(sidecar);
            }
        }

        archive.success_count += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryBlobStore;
    use crate::core::export::planner::BatchPlanner;
    use crate::domain::image::ImageRecord;
    use std::io::Read;
    use zip::ZipArchive;

    const JPEG: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, b'J', b'F', 0xFF, 0xDA, 0x00, 0x02, 0x11, 0x22,
        0xFF, 0xD9,
    ];

    fn key(s: &str) -> StorageKey {
        StorageKey::new(s).unwrap()
    }

    fn single_batch(images: Vec<ImageRecord>) -> Batch {
        BatchPlanner::new(u64::MAX).plan(images).remove(0)
    }

    fn read_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..zip.len())
            .map(|i| {
                let mut file = zip.by_index(i).unwrap();
                assert_eq!(file.compression(), CompressionMethod::Stored);
                let mut content = Vec::new();
                file.read_to_end(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_jpeg_gets_embedded_metadata() {
        let store = Arc::new(InMemoryBlobStore::new());
        store.insert(key("p/a.jpg"), JPEG.to_vec());
        let image = ImageRecord::builder()
            .id("a")
            .unwrap()
            .primary_key("p/a.jpg")
            .unwrap()
            .rating(4)
            .build()
            .unwrap();

        let assembled = ArchiveAssembler::new(store)
            .assemble(&single_batch(vec![image]), "Trip", None)
            .await
            .unwrap();

        assert_eq!(assembled.success_count, 1);
        assert_eq!(assembled.entries, vec!["a.jpg"]);
        let entries = read_entries(&assembled.bytes);
        let document = jpeg::extract(&entries[0].1).unwrap().unwrap();
        assert!(document.contains("xmp:Rating=\"4\""));
    }

    #[tokio::test]
    async fn test_raw_gets_sidecar() {
        let store = Arc::new(InMemoryBlobStore::new());
        store.insert(key("p/b.cr2"), b"raw".to_vec());
        let image = ImageRecord::builder()
            .id("b")
            .unwrap()
            .primary_key("p/b.cr2")
            .unwrap()
            .build()
            .unwrap();

        let assembled = ArchiveAssembler::new(store)
            .assemble(&single_batch(vec![image]), "Trip", None)
            .await
            .unwrap();

        assert_eq!(assembled.entries, vec!["b.cr2", "b.xmp"]);
        let entries = read_entries(&assembled.bytes);
        assert_eq!(entries[0].1, b"raw");
        assert!(String::from_utf8(entries[1].1.clone())
            .unwrap()
            .contains("<x:xmpmeta"));
        assert_eq!(assembled.success_count, 1);
    }

    #[tokio::test]
    async fn test_raw_files_sharing_a_stem_keep_matching_sidecars() {
        let store = Arc::new(InMemoryBlobStore::new());
        store.insert(key("p/a.cr2"), b"canon".to_vec());
        store.insert(key("p/a.nef"), b"nikon".to_vec());
        let image = ImageRecord::builder()
            .id("a")
            .unwrap()
            .primary_key("p/a.cr2")
            .unwrap()
            .related_key("p/a.nef")
            .unwrap()
            .build()
            .unwrap();

        let assembled = ArchiveAssembler::new(store)
            .assemble(&single_batch(vec![image]), "Trip", None)
            .await
            .unwrap();

        assert_eq!(assembled.entries, vec!["a.cr2", "a.xmp", "a.nef", "a.nef.xmp"]);
    }

    #[tokio::test]
    async fn test_malformed_jpeg_falls_back_to_original() {
        let store = Arc::new(InMemoryBlobStore::new());
        store.insert(key("p/bad.jpg"), b"not a jpeg".to_vec());
        let image = ImageRecord::builder()
            .id("bad")
            .unwrap()
            .primary_key("p/bad.jpg")
            .unwrap()
            .build()
            .unwrap();

        let assembled = ArchiveAssembler::new(store)
            .assemble(&single_batch(vec![image]), "Trip", None)
            .await
            .unwrap();

        assert_eq!(assembled.success_count, 1);
        assert_eq!(assembled.fail_count, 0);
        assert_eq!(assembled.issues.len(), 1);
        assert_eq!(assembled.issues[0].error_type, ExportErrorType::Embed);
        assert_eq!(read_entries(&assembled.bytes)[0].1, b"not a jpeg");
    }

    #[tokio::test]
    async fn test_missing_file_is_skipped_and_counted() {
        let store = Arc::new(InMemoryBlobStore::new());
        store.insert(key("p/a.png"), b"png".to_vec());
        let images = vec![
            ImageRecord::builder()
                .id("a")
                .unwrap()
                .primary_key("p/a.png")
                .unwrap()
                .related_key("p/a_missing.tif")
                .unwrap()
                .build()
                .unwrap(),
        ];

        let assembled = ArchiveAssembler::new(store)
            .assemble(&single_batch(images), "Trip", None)
            .await
            .unwrap();

        assert_eq!(assembled.success_count, 1);
        assert_eq!(assembled.fail_count, 1);
        assert_eq!(assembled.entries, vec!["a.png"]);
        assert_eq!(assembled.issues[0].error_type, ExportErrorType::Fetch);
    }

    #[tokio::test]
    async fn test_catalog_first_and_name_collisions() {
        let store = Arc::new(InMemoryBlobStore::new());
        store.insert(key("p/catalog.xmp"), b"<catalog/>".to_vec());
        store.insert(key("p/2023/scan.jpg"), JPEG.to_vec());
        store.insert(key("p/2024/scan.jpg"), JPEG.to_vec());
        let images = ["p/2023/scan.jpg", "p/2024/scan.jpg"]
            .iter()
            .enumerate()
            .map(|(i, k)| {
                ImageRecord::builder()
                    .id(format!("img{i}"))
                    .unwrap()
                    .primary_key(*k)
                    .unwrap()
                    .build()
                    .unwrap()
            })
            .collect();

        let assembled = ArchiveAssembler::new(store)
            .assemble(&single_batch(images), "Trip", Some(&key("p/catalog.xmp")))
            .await
            .unwrap();

        assert_eq!(assembled.entries, vec!["catalog.xmp", "scan.jpg", "scan_2.jpg"]);
        assert_eq!(assembled.success_count, 2);
        assert_eq!(read_entries(&assembled.bytes)[0].1, b"<catalog/>");
    }

    #[tokio::test]
    async fn test_related_files_do_not_count_as_images() {
        let store = Arc::new(InMemoryBlobStore::new());
        store.insert(key("p/a.jpg"), JPEG.to_vec());
        store.insert(key("p/a.cr2"), b"raw".to_vec());
        store.insert(key("p/b.jpg"), JPEG.to_vec());
        let images = vec![
            ImageRecord::builder()
                .id("a")
                .unwrap()
                .primary_key("p/a.jpg")
                .unwrap()
                .related_key("p/a.cr2")
                .unwrap()
                .build()
                .unwrap(),
            ImageRecord::builder()
                .id("b")
                .unwrap()
                .primary_key("p/b.jpg")
                .unwrap()
                .related_key("p/b.nef")
                .unwrap()
                .build()
                .unwrap(),
        ];

        let assembled = ArchiveAssembler::new(store)
            .assemble(&single_batch(images), "Trip", None)
            .await
            .unwrap();

        assert_eq!(assembled.included_images, 2);
        assert_eq!(assembled.success_count, 3);
        assert_eq!(assembled.fail_count, 1);
    }

    #[tokio::test]
    async fn test_missing_primary_is_not_an_included_image() {
        let store = Arc::new(InMemoryBlobStore::new());
        store.insert(key("p/a.cr2"), b"raw".to_vec());
        let image = ImageRecord::builder()
            .id("a")
            .unwrap()
            .primary_key("p/a.jpg")
            .unwrap()
            .related_key("p/a.cr2")
            .unwrap()
            .build()
            .unwrap();

        let assembled = ArchiveAssembler::new(store)
            .assemble(&single_batch(vec![image]), "Trip", None)
            .await
            .unwrap();

        assert_eq!(assembled.included_images, 0);
        assert_eq!(assembled.success_count, 1);
        assert_eq!(assembled.fail_count, 1);
    }

    #[tokio::test]
    async fn test_identical_input_gives_identical_bytes() {
        let store = Arc::new(InMemoryBlobStore::new());
        store.insert(key("p/a.jpg"), JPEG.to_vec());
        let image = ImageRecord::builder()
            .id("a")
            .unwrap()
            .primary_key("p/a.jpg")
            .unwrap()
            .build()
            .unwrap();
        let batch = single_batch(vec![image]);
        let assembler = ArchiveAssembler::new(store);

        let first = assembler.assemble(&batch, "Trip", None).await.unwrap();
        let second = assembler.assemble(&batch, "Trip", None).await.unwrap();
        assert_eq!(first.bytes, second.bytes);
    }
}
