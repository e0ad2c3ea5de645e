//! File format classification
//!
//! Decides how curation metadata travels with a file: embedded in the
//! container, written as a sidecar, or not at all. The format set is closed;
//! supporting a new extension means adding it to [`FileFormat::classify`].

use crate::domain::ids::split_extension;

/// Metadata handling class of a file, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// JPEG: metadata is embedded as an APP1 segment
    Jpeg,
    /// Camera RAW formats: metadata goes into a same-stem `.xmp` sidecar
    Raw(RawFormat),
    /// Anything else is copied unchanged
    Other,
}

/// Camera RAW formats that accept XMP sidecars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawFormat {
    Arw,
    Cr2,
    Cr3,
    Dng,
    Nef,
    Orf,
    Pef,
    Raf,
    Rw2,
    Srw,
}

/// Extension used for sidecar documents
pub const SIDECAR_EXTENSION: &str = "xmp";

impl FileFormat {
    /// Classifies a file extension (without the dot, any case)
    pub fn classify(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" => FileFormat::Jpeg,
            "arw" => FileFormat::Raw(RawFormat::Arw),
            "cr2" => FileFormat::Raw(RawFormat::Cr2),
            "cr3" => FileFormat::Raw(RawFormat::Cr3),
            "dng" => FileFormat::Raw(RawFormat::Dng),
            "nef" => FileFormat::Raw(RawFormat::Nef),
            "orf" => FileFormat::Raw(RawFormat::Orf),
            "pef" => FileFormat::Raw(RawFormat::Pef),
            "raf" => FileFormat::Raw(RawFormat::Raf),
            "rw2" => FileFormat::Raw(RawFormat::Rw2),
            "srw" => FileFormat::Raw(RawFormat::Srw),
            _ => FileFormat::Other,
        }
    }

    /// Classifies a file name by its extension
    pub fn of_file_name(file_name: &str) -> Self {
        match split_extension(file_name).1 {
            Some(ext) => Self::classify(ext),
            None => FileFormat::Other,
        }
    }

    /// Metadata can be written into the file itself
    pub fn is_embeddable(&self) -> bool {
        matches!(self, FileFormat::Jpeg)
    }

    /// Metadata travels as a separate sidecar file
    pub fn supports_sidecar(&self) -> bool {
        matches!(self, FileFormat::Raw(_))
    }
}

/// Sidecar file name for an archive entry name: same stem, `.xmp` extension
pub fn sidecar_name(entry_name: &str) -> String {
    let (stem, _) = split_extension(entry_name);
    format!("{stem}.{SIDECAR_EXTENSION}")
}

/// Sidecar name keeping the entry's extension (`a.nef` -> `a.nef.xmp`)
///
/// Used when two RAW entries share a stem, so each sidecar still names its file.
pub fn qualified_sidecar_name(entry_name: &str) -> String {
    format!("{entry_name}.{SIDECAR_EXTENSION}")
}
