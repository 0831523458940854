//! HTML output escaping.

use crate::sanitize::sanitize_url;
use std::borrow::Cow;

/// Escape text for element content or a quoted attribute value.
#[must_use]
pub fn escape_html(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }

    let mut escaped = String::with_capacity(raw.len() + 16);
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// A URL safe for an `href`: `http`/`https` only, escaped; otherwise empty.
#[must_use]
pub fn escape_url(raw: &str) -> String {
    sanitize_url(raw)
        .map(|url| escape_html(&url).into_owned())
        .unwrap_or_default()
}
