use crate::utils::non_empty;
use once_cell::sync::Lazy;
use regex::Regex;

static CHARACTERISTICS_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:caract[ée]ristiques|characteristics)\s*:")
        .expect("characteristics marker pattern is valid")
});

/// Separator between feature entries
pub const FEATURE_SEPARATOR: &str = " | ";

/// A detail-page text block split into prose and feature lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailText {
    pub description: Option<String>,
    pub features: Option<String>,
}

/// Split a detail text block at its first "Characteristics:" heading.
///
/// Text before the heading is the description. Each non-empty line after it,
/// stripped of bullet markers, is one feature.
pub fn split_characteristics(raw: &str) -> DetailText {
    let Some(marker) = CHARACTERISTICS_MARKER.find(raw) else {
        return DetailText {
            description: non_empty(raw),
            features: None,
        };
    };

    let features = raw[marker.end()..]
        .lines()
        .map(|line| line.trim_start_matches(|c: char| is_bullet(c) || c.is_whitespace()))
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    DetailText {
        description: non_empty(&raw[..marker.start()]),
        features: join_features(features),
    }
}

/// Render one feature table row as `Label: Value`
pub fn feature_pair(label: &str, value: &str) -> Option<String> {
    let (label, value) = (label.trim(), value.trim());
    if label.is_empty() && value.is_empty() {
        return None;
    }
    let pair = format!("{}: {}", label, value);
    non_empty(pair.trim_matches(|c: char| c == ':' || c == ' '))
}

/// Join feature entries, `None` when there are none
pub fn join_features<I, S>(features: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = features
        .into_iter()
        .map(|f| f.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(FEATURE_SEPARATOR);
    if joined.is_empty() { None } else { Some(joined) }
}

/// Whether a feature table label names the product category
pub fn is_category_label(label: &str) -> bool {
    let label = label.to_lowercase();
    label.contains("catégori") || label.contains("categor")
}

fn is_bullet(c: char) -> bool {
    matches!(c, '-' | '•' | '*' | '·' | '–' | '—')
}
