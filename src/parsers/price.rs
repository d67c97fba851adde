/// Parse a price displayed as separate integer and cents fragments.
///
/// Currency signs and whitespace are ignored, a leading decimal separator on the
/// cents is dropped and missing cents count as `00`. A price without an integer
/// part, or one that does not read as a number, is `None`.
pub fn parse_price(integer: &str, cents: &str) -> Option<f64> {
    let integer = strip_noise(integer);
    let mut cents = strip_noise(cents);

    if cents.starts_with([',', '.']) {
        cents.remove(0);
    }
    if cents.is_empty() {
        cents.push_str("00");
    }
    if integer.is_empty() {
        return None;
    }

    if !integer.chars().all(|c| c.is_ascii_digit()) || !cents.chars().all(|c| c.is_ascii_digit())
    {
        ::log::trace!("Unreadable price fragments {:?} / {:?}", integer, cents);
        return None;
    }

    format!("{}.{}", integer, cents).parse::<f64>().ok()
}

fn strip_noise(fragment: &str) -> String {
    fragment
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .collect()
}
