//! Batch planning for archive exports
//!
//! This module partitions a project's images into size-bounded batches,
//! one archive per batch.

use crate::domain::image::ImageRecord;

/// A contiguous group of images destined for one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    images: Vec<ImageRecord>,
    total_bytes: u64,
}

impl Batch {
    fn new() -> Self {
        Self {
            images: Vec::new(),
            total_bytes: 0,
        }
    }

    fn push(&mut self, image: ImageRecord) {
        self.total_bytes = self.total_bytes.saturating_add(image.size_bytes);
        self.images.push(image);
    }

    /// Images in archive order
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// Number of images in the batch
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true if the batch holds no images
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Cumulative primary-file size
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}

/// Partitions images into batches under a byte ceiling
#[derive(Debug, Clone, Copy)]
pub struct BatchPlanner {
    ceiling_bytes: u64,
}

impl BatchPlanner {
    /// Create a planner with the given per-archive ceiling
    pub fn new(ceiling_bytes: u64) -> Self {
        Self { ceiling_bytes }
    }

    /// Configured ceiling in bytes
    pub fn ceiling_bytes(&self) -> u64 {
        self.ceiling_bytes
    }

    /// Plan batches for an export
    ///
    /// Images are ordered by primary storage key (stable, so equal keys keep
    /// their input order). A new batch starts when adding the next image
    /// would push a non-empty batch past the ceiling. An image larger than
    /// the ceiling gets a batch to itself; images are never split or dropped.
    /// Empty input yields no batches.
    pub fn plan(&self, mut images: Vec<ImageRecord>) -> Vec<Batch> {
        images.sort_by(|a, b| a.primary_key.cmp(&b.primary_key));

        let mut batches = Vec::new();
        let mut current = Batch::new();

        for image in images {
            let would_be = current.total_bytes.saturating_add(image.size_bytes);
            if would_be > self.ceiling_bytes && !current.is_empty() {
                batches.push(std::mem::replace(&mut current, Batch::new()));
            }
            current.push(image);
        }

        if !current.is_empty() {
            batches.push(current);
        }

        tracing::debug!(
            batch_count = batches.len(),
            ceiling_bytes = self.ceiling_bytes,
            "Planned export batches"
        );

        batches
    }
}
