//! Input sanitizers for admin-submitted values.
//!
//! Every record and settings field passes through one of these before it is
//! persisted, so stored documents never hold markup or malformed URLs.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Lower-case a key and keep only `[a-z0-9_-]`.
#[must_use]
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// Single-line plain text: tags stripped, whitespace runs collapsed, trimmed.
#[must_use]
pub fn sanitize_text(raw: &str) -> String {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let tags = TAG_REGEX.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

    let stripped = tags.replace_all(raw, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep a URL only if it is an absolute `http`/`https` URL.
#[must_use]
pub fn sanitize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Some(url.to_string())
        }
        _ => None,
    }
}

/// Split newline-separated text into trimmed, non-empty, sanitized lines.
#[must_use]
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(sanitize_text)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Parse a non-negative integer the way form posts deliver it.
///
/// Leading digits are taken (`"12abc"` is 12), a leading `-` yields the
/// absolute value, anything else is 0.
#[must_use]
pub fn parse_absint(raw: &str) -> u64 {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let digits: String = unsigned.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}
