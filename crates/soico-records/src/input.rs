//! Coercion of loosely-typed admin input.
//!
//! Admin forms submit numbers as strings, checkboxes as `"1"`/missing and
//! feature lists as newline-separated text; these helpers normalise them.

use serde_json::Value;
use soico_core::sanitize::{parse_absint, sanitize_text, split_lines};
use soico_core::HexColor;

/// Sanitized text of a scalar; non-scalars read as empty.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => sanitize_text(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        _ => String::new(),
    }
}

/// Form-style truthiness.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Absolute integer value; anything unparsable is 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn absint(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(i64::unsigned_abs))
            .or_else(|| n.as_f64().map(|f| f.abs().trunc() as u64))
            .unwrap_or(0),
        Value::String(s) => parse_absint(s),
        Value::Bool(true) => 1,
        _ => 0,
    }
}

/// Valid hex colour or `None`.
pub(crate) fn color(value: &Value) -> Option<HexColor> {
    value.as_str().and_then(HexColor::parse)
}

/// Feature list from an array or newline-separated text.
pub(crate) fn features(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => split_lines(s),
        Value::Array(items) => items
            .iter()
            .map(text)
            .filter(|feature| !feature.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absint() {
        assert_eq!(absint(&json!(5)), 5);
        assert_eq!(absint(&json!(-5)), 5);
        assert_eq!(absint(&json!(2.9)), 2);
        assert_eq!(absint(&json!("12px")), 12);
        assert_eq!(absint(&json!(null)), 0);
        assert_eq!(absint(&json!([1])), 0);
    }

    #[test]
    fn test_text_of_non_strings() {
        assert_eq!(text(&json!(8)), "8");
        assert_eq!(text(&json!(false)), "");
        assert_eq!(text(&json!({"a": 1})), "");
    }

    #[test]
    fn test_color() {
        assert_eq!(color(&json!("#abc")).as_ref().map(HexColor::as_str), Some("#abc"));
        assert!(color(&json!(123)).is_none());
    }
}
