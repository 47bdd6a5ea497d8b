//! Path-segment extraction from source URLs.

/// Extracts the last non-empty path segment of a URL, percent-decoded.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;
    let decoded = percent_encoding::percent_decode_str(segment).decode_utf8_lossy();
    if decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded.into_owned())
}

/// Host component of a URL, if any.
pub fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.to_string())
}
