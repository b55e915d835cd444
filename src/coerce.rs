//! Value Coercion - Host-Compatible Primitive Conversions
//!
//! Layout catalogs were authored against a JavaScript host, so text output and
//! prop coercion follow its `String()`, `Boolean()` and `Number()` rules.

use serde_json::{Number, Value};

/// Render a value the way the host's `String(value)` would.
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Truthiness per the host's `Boolean(value)`.
pub fn to_js_boolean(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric conversion per the host's `Number(value)`.
///
/// JSON cannot carry NaN or infinities, so those results come back as `Value::Null`.
pub fn to_js_number(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(n.clone()),
        other => js_number(other).map_or(Value::Null, f64_to_value),
    }
}

fn js_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_string(s),
        Value::Array(items) => match items.as_slice() {
            [] => Some(0.0),
            [single] => parse_numeric_string(&to_js_string(single)),
            _ => None,
        },
        Value::Object(_) => None,
    }
}

fn parse_numeric_string(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&trimmed[2..], radix).ok().map(|n| n as f64);
    }

    // Rust accepts "inf"/"nan" spellings the host rejects; both end up non-finite.
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn f64_to_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}

fn number_to_string(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f64_to_string(f),
        _ => n.to_string(),
    }
}

/// Shortest round-trip digits; exponent form outside `[1e-6, 1e21)`.
fn f64_to_string(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&f.abs()) {
        return f.to_string();
    }
    let scientific = format!("{:e}", f);
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => scientific,
    }
}
