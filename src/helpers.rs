//! Display-formatting helpers used as askama filters in the page templates.

use chrono::NaiveDateTime;

/// Format a stored `YYYY-MM-DD HH:MM:SS` timestamp as `M/D/YYYY`.
/// Unparseable input is returned unchanged rather than breaking the page.
pub fn format_date(timestamp: &str) -> String {
    match NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S") {
        Ok(dt) => dt.format("%-m/%-d/%Y").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Lowercase a word and pluralize it unless the amount is exactly one.
pub fn format_plural(word: &str, amount: i64) -> String {
    let word = word.to_lowercase();
    if amount == 1 {
        word
    } else {
        format!("{word}s")
    }
}

/// Shorten a URL for display: strip the scheme and a leading `www.`, then
/// cut at the first path segment or query string.
pub fn format_url(url: &str) -> String {
    url.trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_start_matches("www.")
        .split('/')
        .next()
        .unwrap_or("")
        .split('?')
        .next()
        .unwrap_or("")
        .to_string()
}
