//! Permissive numeric input
//!
//! Every numeric field that reaches the calculator passes through these
//! functions. Invalid input never fails: it degrades to `0`, or to `1` where a
//! "at least one" floor applies (batch quantity, crew size). This keeps a
//! half-edited scenario computable.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce an arbitrary JSON value to a finite number.
///
/// Numbers pass through, numeric strings are parsed (a decimal comma is
/// accepted), booleans map to 1/0, everything else becomes 0.
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => coerce_str(s),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    finite_or_zero(n)
}

/// Coerce user-typed text to a finite number (empty or garbage becomes 0)
pub fn coerce_str(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let normalized = trimmed.replace(',', ".");
    normalized
        .parse::<f64>()
        .map(finite_or_zero)
        .unwrap_or(0.0)
}

/// Replace NaN and infinities with 0
pub fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Clamp to `[0, +inf)`; non-finite input becomes 0
pub fn parse_non_negative(n: f64) -> f64 {
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}

/// Floor at 1; non-finite input becomes 1
pub fn parse_at_least_one(n: f64) -> f64 {
    if n.is_finite() && n >= 1.0 {
        n
    } else {
        1.0
    }
}

/// Render a JSON scalar as text (`null` and containers become empty)
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Serde adapter: accept any JSON value for an `f64` field
pub fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

/// Serde adapter: accept any JSON scalar for a `String` field
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_text(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_number_variants() {
        assert_eq!(coerce_number(&json!(3.5)), 3.5);
        assert_eq!(coerce_number(&json!("12.5")), 12.5);
        assert_eq!(coerce_number(&json!(" 3,9 ")), 3.9);
        assert_eq!(coerce_number(&json!("abc")), 0.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!(true)), 1.0);
        assert_eq!(coerce_number(&json!([1, 2])), 0.0);
        assert_eq!(coerce_number(&json!({"a": 1})), 0.0);
    }

    #[test]
    fn test_coerce_str_rejects_non_finite() {
        assert_eq!(coerce_str("inf"), 0.0);
        assert_eq!(coerce_str("NaN"), 0.0);
        assert_eq!(coerce_str("-4"), -4.0);
    }

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(parse_non_negative(2.0), 2.0);
        assert_eq!(parse_non_negative(0.0), 0.0);
        assert_eq!(parse_non_negative(-1.0), 0.0);
        assert_eq!(parse_non_negative(f64::NAN), 0.0);
        assert_eq!(parse_non_negative(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_parse_at_least_one() {
        assert_eq!(parse_at_least_one(100.0), 100.0);
        assert_eq!(parse_at_least_one(1.0), 1.0);
        assert_eq!(parse_at_least_one(0.5), 1.0);
        assert_eq!(parse_at_least_one(0.0), 1.0);
        assert_eq!(parse_at_least_one(-3.0), 1.0);
        assert_eq!(parse_at_least_one(f64::NAN), 1.0);
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce_text(&json!("Laser")), "Laser");
        assert_eq!(coerce_text(&json!(42)), "42");
        assert_eq!(coerce_text(&json!(null)), "");
    }

    #[test]
    fn test_lenient_adapters() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "lenient_number")]
            qty: f64,
            #[serde(deserialize_with = "lenient_text")]
            name: String,
        }

        let row: Row = serde_json::from_str(r#"{"qty": "7", "name": 12}"#).unwrap();
        assert_eq!(row.qty, 7.0);
        assert_eq!(row.name, "12");

        let row: Row = serde_json::from_str(r#"{"qty": null, "name": null}"#).unwrap();
        assert_eq!(row.qty, 0.0);
        assert_eq!(row.name, "");
    }
}
