use url::Url;

/// Collapse runs of whitespace into single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed text, or `None` when nothing is left
pub fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The first `len` characters of `text`
pub fn fingerprint(text: &str, len: usize) -> String {
    text.chars().take(len).collect()
}

/// Resolve a link or media attribute against the page it was found on.
///
/// Empty values and script pseudo-links yield `None`.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.to_lowercase().starts_with("javascript") {
        return None;
    }
    base.join(href).ok().map(|url| url.to_string())
}
