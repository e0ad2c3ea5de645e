//! Curation metadata output
//!
//! - [`format`] - Closed classification of file formats by extension
//! - [`xmp`] - XMP document rendering for one image
//! - [`jpeg`] - JPEG segment parsing and XMP embedding

pub mod format;
pub mod jpeg;
pub mod xmp;

pub use format::{FileFormat, RawFormat};
pub use jpeg::{embed, extract, JpegContainer, Segment};
pub use xmp::render;
