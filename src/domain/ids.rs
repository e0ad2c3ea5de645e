//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for project, image and storage identifiers.
//! Each type ensures type safety and rejects empty values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Project identifier newtype wrapper
///
/// # Examples
///
/// ```
/// use keepsake::domain::ids::ProjectId;
/// use std::str::FromStr;
///
/// let project_id = ProjectId::from_str("proj-2024-sw").unwrap();
/// assert_eq!(project_id.as_str(), "proj-2024-sw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a new ProjectId from a string
    ///
    /// Returns `Err` if the identifier is empty or whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Project ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the project ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProjectId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Image identifier newtype wrapper
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(String);

impl ImageId {
    /// Creates a new ImageId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Image ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the image ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ImageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Blob store key newtype wrapper
///
/// Keys are `/`-separated paths such as `projects/sw-2024/IMG_0001.jpg`.
/// The last segment is the file name used as the archive entry base name.
///
/// # Examples
///
/// ```
/// use keepsake::domain::ids::StorageKey;
///
/// let key = StorageKey::new("projects/sw/IMG_0001.CR2").unwrap();
/// assert_eq!(key.file_name(), "IMG_0001.CR2");
/// assert_eq!(key.extension(), Some("CR2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageKey(String);

impl StorageKey {
    /// Creates a new StorageKey from a string
    ///
    /// Returns `Err` if the key is empty or ends with `/`
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err("Storage key cannot be empty".to_string());
        }
        if key.ends_with('/') {
            return Err(format!("Storage key cannot end with '/': {key}"));
        }
        Ok(Self(key))
    }

    /// Builds a key from a prefix and a relative name
    ///
    /// Redundant slashes at the join point are collapsed; an empty prefix
    /// yields the name unchanged.
    pub fn join(prefix: &str, name: &str) -> Result<Self, String> {
        let prefix = prefix.trim_end_matches('/');
        let name = name.trim_start_matches('/');
        if prefix.is_empty() {
            Self::new(name)
        } else {
            Self::new(format!("{prefix}/{name}"))
        }
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment of the key
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Extension of the file name without the dot, if any
    pub fn extension(&self) -> Option<&str> {
        split_extension(self.file_name()).1
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StorageKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Splits a file name into stem and extension (without the dot)
///
/// A leading dot does not start an extension, so `.hidden` has no extension.
pub fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], Some(&file_name[idx + 1..])),
        _ => (file_name, None),
    }
}
