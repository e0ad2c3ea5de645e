//! Archive key derivation
//!
//! Archive keys are built from the project's storage prefix, a sanitized
//! project name, the run date and, for multi-part exports, a 1-based part
//! number: `{prefix}/{archive_dir}/{name}_{YYYYMMDD}[_part{n}].zip`.

use crate::domain::ids::StorageKey;
use crate::domain::{KeepsakeError, Result};
use chrono::NaiveDate;

/// Name used when sanitizing leaves nothing
pub const PLACEHOLDER_NAME: &str = "project";

/// Content type of uploaded archives
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Lower-cases a project name and collapses every run of characters other
/// than ASCII letters and digits into one underscore
///
/// Leading and trailing underscores are trimmed, the result is capped at
/// `max_len` characters, and an empty result becomes [`PLACEHOLDER_NAME`].
///
/// # Examples
///
/// ```
/// use keepsake::core::export::naming::sanitize_project_name;
///
/// assert_eq!(sanitize_project_name("South-West 2024!!", 50), "south_west_2024");
/// assert_eq!(sanitize_project_name("???", 50), "project");
/// ```
pub fn sanitize_project_name(name: &str, max_len: usize) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            sanitized.push(c.to_ascii_lowercase());
            last_was_underscore = false;
        } else if !last_was_underscore {
            sanitized.push('_');
            last_was_underscore = true;
        }
    }

    // Only ASCII remains, so byte truncation is safe.
    let trimmed = sanitized.trim_matches('_');
    let capped = &trimmed[..trimmed.len().min(max_len)];
    let capped = capped.trim_end_matches('_');

    if capped.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        capped.to_string()
    }
}

/// Derives archive keys for one export run
#[derive(Debug, Clone)]
pub struct ArchiveNaming {
    storage_prefix: String,
    archive_dir: String,
    base_name: String,
    run_date: NaiveDate,
    part_count: usize,
}

impl ArchiveNaming {
    /// Create naming for a run producing `part_count` archives
    pub fn new(
        storage_prefix: &str,
        archive_dir: &str,
        project_name: &str,
        max_name_length: usize,
        run_date: NaiveDate,
        part_count: usize,
    ) -> Self {
        Self {
            storage_prefix: storage_prefix.trim_end_matches('/').to_string(),
            archive_dir: archive_dir.trim_matches('/').to_string(),
            base_name: sanitize_project_name(project_name, max_name_length),
            run_date,
            part_count,
        }
    }

    /// Sanitized project name used in every key
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Key of the archive for the 1-based `part_number`
    ///
    /// The part suffix is only added when the run has more than one part.
    pub fn key_for(&self, part_number: usize) -> Result<StorageKey> {
        let date = self.run_date.format("%Y%m%d");
        let file_name = if self.part_count > 1 {
            format!("{}_{}_part{}.zip", self.base_name, date, part_number)
        } else {
            format!("{}_{}.zip", self.base_name, date)
        };

        let dir = if self.archive_dir.is_empty() {
            self.storage_prefix.clone()
        } else if self.storage_prefix.is_empty() {
            self.archive_dir.clone()
        } else {
            format!("{}/{}", self.storage_prefix, self.archive_dir)
        };

        StorageKey::join(&dir, &file_name).map_err(KeepsakeError::Validation)
    }
}
