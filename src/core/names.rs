/// Splits free-form roster text on commas, periods, and newlines.
///
/// Segments are trimmed and empty ones dropped, so `"Alice, Bob.\nCharlie"`
/// yields three names and whitespace-only input yields none.
pub fn parse_names(raw: &str) -> Vec<&str> {
    raw.split([',', '.', '\n'])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}
