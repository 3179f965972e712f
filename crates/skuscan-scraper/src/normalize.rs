//! Text normalization for match comparison and display.
//!
//! Every comparison the matcher performs goes through [`normalize`]; raw
//! page or user strings are never compared directly. [`clean_text`] is a
//! display helper only.

/// Lowercases and trims `text`.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// [`normalize`] for optional text; absent text becomes `""`.
#[must_use]
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Collapses every whitespace run to a single space and trims the ends.
///
/// HTML text nodes carry indentation and line breaks from the markup; this
/// makes them presentable. Case is preserved.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
