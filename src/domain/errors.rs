//! Domain error types
//!
//! This module defines the error hierarchy for Keepsake.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Keepsake error type
///
/// This is the primary error type used throughout the application.
/// Only [`KeepsakeError::Load`] aborts an export run; the other variants are
/// absorbed by the export coordinator and reported in the summary.
#[derive(Debug, Error)]
pub enum KeepsakeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Project or image list could not be loaded (fatal for a run)
    #[error("Load error: {0}")]
    Load(String),

    /// Blob store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Metadata store errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// JPEG container errors
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Archive writer errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Blob store errors
///
/// Errors that occur when reading or writing objects.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Failed to read an object
    #[error("Failed to read {key}: {message}")]
    ReadFailed { key: String, message: String },

    /// Failed to write an object
    #[error("Failed to write {key}: {message}")]
    WriteFailed { key: String, message: String },

    /// Key cannot be mapped onto the backend
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Metadata store errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Project does not exist
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Failed to update a project record
    #[error("Failed to update project {id}: {message}")]
    UpdateFailed { id: String, message: String },

    /// Stored record could not be decoded
    #[error("Corrupt record {0}")]
    CorruptRecord(String),
}

/// JPEG container errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    /// Input is not a valid marker-delimited stream
    #[error("Malformed container at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    /// Metadata document does not fit in a single segment
    #[error("Metadata payload of {size} bytes exceeds segment limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },
}

impl ContainerError {
    /// Creates a malformed-container error at the given byte offset
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        ContainerError::Malformed {
            offset,
            reason: reason.into(),
        }
    }
}

impl StorageError {
    /// Returns true when the object simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for KeepsakeError {
    fn from(err: std::io::Error) -> Self {
        KeepsakeError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for KeepsakeError {
    fn from(err: serde_json::Error) -> Self {
        KeepsakeError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for KeepsakeError {
    fn from(err: toml::de::Error) -> Self {
        KeepsakeError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from archive writer errors
impl From<zip::result::ZipError> for KeepsakeError {
    fn from(err: zip::result::ZipError) -> Self {
        KeepsakeError::Archive(err.to_string())
    }
}
