use once_cell::sync::Lazy;
use regex::Regex;

static SOLD_BY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:vendu(?:\s+et\s+exp[ée]di[ée])?\s+par|sold(?:\s+and\s+shipped)?\s+by)\s*:?\s*",
    )
    .expect("seller prefix pattern is valid")
});

/// Extract the seller name from a "sold by" caption.
///
/// Only the first line counts; the "Vendu par" / "Sold by" lead-in and surrounding
/// punctuation are removed. Nothing left means no seller.
pub fn clean_seller(text: &str) -> Option<String> {
    let line = text.trim().lines().next()?.trim();
    let line = SOLD_BY_PREFIX.replace(line, "");
    let name = line
        .trim_matches(|c: char| c == ':' || c == '-' || c == '\u{a0}' || c.is_whitespace());

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
