//! Image domain model
//!
//! This module defines [`ImageRecord`], one curated photo as stored in the
//! metadata store. The export engine only ever reads these records.

use super::ids::{ImageId, StorageKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One curated photo
///
/// # Examples
///
/// ```
/// use keepsake::domain::image::ImageRecord;
///
/// let image = ImageRecord::builder()
///     .id("img-001")
///     .unwrap()
///     .primary_key("projects/sw/IMG_0001.jpg")
///     .unwrap()
///     .size_bytes(4_200_000)
///     .rating(4)
///     .keyword("coast")
///     .build()
///     .unwrap();
/// assert_eq!(image.keywords, vec!["coast".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Unique identifier
    pub id: ImageId,

    /// Storage key of the primary file
    pub primary_key: StorageKey,

    /// Storage keys of related files (e.g. a linked RAW original)
    #[serde(default)]
    pub related_keys: Vec<StorageKey>,

    /// Size of the primary file in bytes
    pub size_bytes: u64,

    /// Star rating, 0 = unset, 1-5 valid
    #[serde(default)]
    pub rating: i32,

    /// Group number, 0 = unset, 1-5 map to a color label
    #[serde(default)]
    pub group: i32,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Keywords in curation order, without duplicates
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ImageRecord {
    /// Creates a new builder for constructing an ImageRecord
    pub fn builder() -> ImageRecordBuilder {
        ImageRecordBuilder::default()
    }

    /// Color label for the record's group number, if any
    pub fn color_label(&self) -> Option<ColorLabel> {
        ColorLabel::from_group(self.group)
    }

    /// Primary file followed by related files
    pub fn all_keys(&self) -> impl Iterator<Item = &StorageKey> {
        std::iter::once(&self.primary_key).chain(self.related_keys.iter())
    }
}

/// Fixed color-label set keyed by group number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorLabel {
    Red,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl ColorLabel {
    /// Maps a group number to its label; numbers outside 1-5 have none
    pub fn from_group(group: i32) -> Option<Self> {
        match group {
            1 => Some(ColorLabel::Red),
            2 => Some(ColorLabel::Yellow),
            3 => Some(ColorLabel::Green),
            4 => Some(ColorLabel::Blue),
            5 => Some(ColorLabel::Purple),
            _ => None,
        }
    }

    /// Label text as written into metadata documents
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorLabel::Red => "Red",
            ColorLabel::Yellow => "Yellow",
            ColorLabel::Green => "Green",
            ColorLabel::Blue => "Blue",
            ColorLabel::Purple => "Purple",
        }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for constructing ImageRecord instances
#[derive(Debug, Default)]
pub struct ImageRecordBuilder {
    id: Option<ImageId>,
    primary_key: Option<StorageKey>,
    related_keys: Vec<StorageKey>,
    size_bytes: u64,
    rating: i32,
    group: i32,
    description: String,
    keywords: Vec<String>,
}

impl ImageRecordBuilder {
    /// Creates a new ImageRecordBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the image ID
    pub fn id(mut self, id: impl Into<String>) -> Result<Self, String> {
        self.id = Some(ImageId::new(id)?);
        Ok(self)
    }

    /// Sets the primary file key
    pub fn primary_key(mut self, key: impl Into<String>) -> Result<Self, String> {
        self.primary_key = Some(StorageKey::new(key)?);
        Ok(self)
    }

    /// Adds a related file key
    pub fn related_key(mut self, key: impl Into<String>) -> Result<Self, String> {
        self.related_keys.push(StorageKey::new(key)?);
        Ok(self)
    }

    /// Sets the primary file size
    pub fn size_bytes(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Sets the rating
    pub fn rating(mut self, rating: i32) -> Self {
        self.rating = rating;
        self
    }

    /// Sets the group number
    pub fn group(mut self, group: i32) -> Self {
        self.group = group;
        self
    }

    /// Sets the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a keyword; repeated keywords are ignored
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    /// Builds the ImageRecord
    ///
    /// # Errors
    ///
    /// Returns an error if the ID or primary key is missing
    pub fn build(self) -> Result<ImageRecord, String> {
        Ok(ImageRecord {
            id: self.id.ok_or("id is required")?,
            primary_key: self.primary_key.ok_or("primary_key is required")?,
            related_keys: self.related_keys,
            size_bytes: self.size_bytes,
            rating: self.rating,
            group: self.group,
            description: self.description,
            keywords: self.keywords,
        })
    }
}
