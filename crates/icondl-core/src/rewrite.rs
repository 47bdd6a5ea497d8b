//! Resolution upgrade for icon image references.
//!
//! Catalog tiles reference small renditions (`size=48`, `size=96`) in their
//! srcset; the same asset is served at `size=1024` by swapping the parameter.

use crate::extract::IconRecord;

/// Query parameters that select a small rendition.
const SMALL_SIZES: [&str; 2] = ["size=48", "size=96"];
/// Replacement parameter selecting the large rendition.
const LARGE_SIZE: &str = "size=1024";

/// An icon ready for download: file stem plus the upgraded URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenAsset {
    pub name: String,
    pub download_url: String,
}

impl RewrittenAsset {
    pub fn from_record(record: &IconRecord) -> Self {
        Self {
            name: record.name.clone(),
            download_url: upgrade_resolution(&record.source_reference),
        }
    }
}

/// Returns the first URL of a srcset with every small size marker replaced by `size=1024`.
///
/// Input without a marker yields its first segment unchanged; empty input
/// yields an empty string. Idempotent, since `size=1024` contains no marker.
pub fn upgrade_resolution(reference: &str) -> String {
    let first = reference.split_whitespace().next().unwrap_or("");
    SMALL_SIZES
        .iter()
        .fold(first.to_string(), |url, marker| url.replace(marker, LARGE_SIZE))
}
