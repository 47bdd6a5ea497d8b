//! Naming of job folders and icon files.
//!
//! Job folders come from the last path segment of the source URL; icon files
//! are `<name>.png`. Both pass through the same Linux-safe sanitizer.

mod path;
mod sanitize;

use std::collections::HashMap;

pub use path::{host_of, last_path_segment};
pub use sanitize::sanitize_stem;

/// Folder name used when the URL yields nothing usable.
const DEFAULT_FOLDER: &str = "icons";

/// Derives the output folder name for a source URL.
///
/// Prefers the last non-empty path segment, then the host name, then `icons`.
///
/// # Examples
///
/// - `job_folder_name("https://example.com/icon/set/nature/dusk")` → `"dusk"`
/// - `job_folder_name("https://example.com/")` → `"example.com"`
pub fn job_folder_name(source_url: &str) -> String {
    [last_path_segment(source_url), host_of(source_url)]
        .into_iter()
        .flatten()
        .map(|c| sanitize_stem(&c))
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FOLDER.to_string())
}

/// File name for a downloaded icon.
pub fn icon_file_name(name: &str) -> String {
    format!("{name}.png")
}

/// Hands out distinct folder names within one run.
///
/// The first job keeps the derived name; later collisions get `-2`, `-3`, ...
#[derive(Debug, Default)]
pub struct FolderAllocator {
    seen: HashMap<String, u32>,
}

impl FolderAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, source_url: &str) -> String {
        let base = job_folder_name(source_url);
        let mut n = *self.seen.get(&base).unwrap_or(&0);
        loop {
            n += 1;
            let candidate = if n == 1 { base.clone() } else { format!("{base}-{n}") };
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(base.clone(), n);
                self.seen.insert(candidate.clone(), 1);
                return candidate;
            }
        }
    }
}
