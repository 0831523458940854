//! Display text resolution shared by every widget.

use soico_core::html::escape_html;
use std::borrow::Cow;

/// `Some` only for text with visible content.
#[must_use]
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Pick the first present value of `override_text` and `record_field`,
/// otherwise build `fallback`.
///
/// Empty and whitespace-only strings count as absent at both levels.
pub fn display_value<'a>(
    override_text: Option<&'a str>,
    record_field: Option<&'a str>,
    fallback: impl FnOnce() -> String,
) -> Cow<'a, str> {
    present(override_text)
        .or_else(|| present(record_field))
        .map_or_else(|| Cow::Owned(fallback()), Cow::Borrowed)
}

/// Substitute `{{name}}` in a copy template.
#[must_use]
pub fn fill(template: &str, name: &str) -> String {
    template.replace("{{name}}", name)
}

/// Diagnostic comment for a widget that rendered nothing; empty unless `debug`.
#[must_use]
pub fn diagnostic(debug: bool, message: &str) -> String {
    if debug {
        format!("<!-- [SOICO CTA Debug] {} -->", escape_html(message))
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let value = display_value(Some("Custom"), Some("Record"), || "Default".to_string());
        assert_eq!(value, "Custom");
    }

    #[test]
    fn test_empty_override_falls_through() {
        assert_eq!(
            display_value(Some(""), Some("Record"), || "Default".to_string()),
            "Record"
        );
        assert_eq!(
            display_value(Some("  "), Some(""), || "Default".to_string()),
            "Default"
        );
        assert_eq!(display_value(None, None, || "Default".to_string()), "Default");
    }

    #[test]
    fn test_fallback_is_lazy() {
        let value = display_value(Some("set"), None, || unreachable!("fallback built"));
        assert_eq!(value, "set");
    }

    #[test]
    fn test_fill() {
        assert_eq!(fill("{{name}}で口座開設", "SBI証券"), "SBI証券で口座開設");
        assert_eq!(fill("no placeholder", "x"), "no placeholder");
    }

    #[test]
    fn test_diagnostic() {
        assert_eq!(diagnostic(false, "missing"), "");
        assert_eq!(
            diagnostic(true, "Record not found: <sbi>"),
            "<!-- [SOICO CTA Debug] Record not found: &lt;sbi&gt; -->"
        );
    }
}
