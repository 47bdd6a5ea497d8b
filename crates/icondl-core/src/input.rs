//! Source URL parsing for submitted free-form text.

/// Splits submitted text on whitespace and keeps the distinct http(s) URLs,
/// in submission order. Anything else is logged and dropped.
pub fn parse_source_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        match url::Url::parse(token) {
            Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => {
                let s = u.to_string();
                if !urls.contains(&s) {
                    urls.push(s);
                }
            }
            _ => tracing::warn!(token, "ignoring input that is not an http(s) URL"),
        }
    }
    urls
}
