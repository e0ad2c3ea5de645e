//! Archive entry name allocation
//!
//! Every entry in one archive needs a distinct name. A fresh allocator is
//! created for each batch.

use crate::domain::ids::split_extension;
use std::collections::{HashMap, HashSet};

/// Resolves duplicate base names into unique entry names
///
/// The first request for a name returns it unchanged. Later requests for the
/// same name return `{stem}_{n}{.ext}` with `n` counting up from 2. A
/// generated name that is already taken is skipped, so the result is unique
/// even when the input itself contains names like `scan_2.jpg`.
///
/// # Examples
///
/// ```
/// use keepsake::core::export::FilenameAllocator;
///
/// let mut names = FilenameAllocator::new();
/// assert_eq!(names.allocate("a.jpg"), "a.jpg");
/// assert_eq!(names.allocate("a.jpg"), "a_2.jpg");
/// assert_eq!(names.allocate("a.jpg"), "a_3.jpg");
/// ```
#[derive(Debug, Default)]
pub struct FilenameAllocator {
    counters: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl FilenameAllocator {
    /// Create an allocator with no names taken
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a unique name derived from `base_name`
    pub fn allocate(&mut self, base_name: &str) -> String {
        let counter = self.counters.entry(base_name.to_string()).or_insert(0);

        let name = loop {
            let candidate = if *counter == 0 {
                base_name.to_string()
            } else {
                numbered(base_name, *counter + 1)
            };
            *counter += 1;
            if !self.taken.contains(&candidate) {
                break candidate;
            }
        };

        self.taken.insert(name.clone());
        name
    }

    /// Returns true if `name` has already been handed out
    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Number of names handed out
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    /// Returns true if no names have been handed out
    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

fn numbered(base_name: &str, n: usize) -> String {
    match split_extension(base_name) {
        (stem, Some(ext)) => format!("{stem}_{n}.{ext}"),
        (stem, None) => format!("{stem}_{n}"),
    }
}
