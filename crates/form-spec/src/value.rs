//! Value helpers shared by the condition and rule evaluators.
//!
//! `None` stands for an absent key (undefined); `Some(Value::Null)` for an
//! explicit null. The two only differ for `equals`/`notEquals`.

use std::borrow::Cow;

use serde_json::Value;

/// Reads a top-level key of a data object; non-object data has no keys.
pub fn lookup<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    data.as_object().and_then(|map| map.get(key))
}

/// Emptiness used by `required` and by the empty-skip policy of every other
/// rule: absent, null, whitespace-only string or empty array.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Emptiness used by the `isEmpty` condition operator. Arrays never count.
pub fn is_condition_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

/// Strict equality; numbers compare by numeric value so `1` equals `1.0`.
pub fn strict_equals(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(Value::Number(left)), Some(Value::Number(right))) => {
            match (left.as_f64(), right.as_f64()) {
                (Some(left), Some(right)) => left == right,
                _ => left == right,
            }
        }
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Numeric coercion for `min`/`max`. Strings are parsed after trimming; any
/// other shape, or a non-finite result, is not a number.
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Text form of scalar values, used by `email` and `pattern`.
pub fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
        _ => None,
    }
}

/// Length used by `minLength`/`maxLength`: characters for scalars, items for
/// arrays.
pub fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        other => as_text(other).map(|text| text.chars().count()),
    }
}

/// Bound configured on a rule, which may arrive as a number or numeric string.
pub fn bound(rule_value: Option<&Value>) -> Option<f64> {
    rule_value.and_then(as_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_covers_whitespace_and_empty_arrays() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!(null))));
        assert!(is_blank(Some(&json!("   "))));
        assert!(is_blank(Some(&json!([]))));
        assert!(!is_blank(Some(&json!(0))));
        assert!(!is_blank(Some(&json!(false))));
        assert!(!is_blank(Some(&json!([1]))));
    }

    #[test]
    fn condition_empty_ignores_arrays_and_whitespace() {
        assert!(is_condition_empty(Some(&json!(""))));
        assert!(!is_condition_empty(Some(&json!(" "))));
        assert!(!is_condition_empty(Some(&json!([]))));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(strict_equals(Some(&json!(1)), Some(&json!(1.0))));
        assert!(!strict_equals(Some(&json!(1)), Some(&json!("1"))));
        assert!(!strict_equals(None, Some(&json!(null))));
    }

    #[test]
    fn coercion_rejects_non_numeric_text() {
        assert_eq!(as_number(&json!(" 42 ")), Some(42.0));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!(true)), None);
    }

    #[test]
    fn length_counts_characters() {
        assert_eq!(length_of(&json!("héllo")), Some(5));
        assert_eq!(length_of(&json!([1, 2])), Some(2));
        assert_eq!(length_of(&json!(1234)), Some(4));
        assert_eq!(length_of(&json!({})), None);
    }
}
