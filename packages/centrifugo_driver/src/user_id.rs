//! Loose user identifier handling.
//!
//! Hosts pass user ids as numbers or strings, and the broker reports them back
//! as strings. Comparison happens on a normalized integer.

use serde_json::Value;

/// Reduce a user id to an integer.
///
/// Integers pass through; floats truncate toward zero (lossy: `123.9` is `123`);
/// strings use their leading numeric part (`"42abc"` is `42`, `"user"` is `0`);
/// booleans become `0`/`1`; everything else is `0`.
pub fn normalize(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(truncate))
            .unwrap_or(0),
        Value::String(s) => parse_loose(s),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// The string form sent to the broker and placed in client params.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && is_integral(f) => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Floats with no fractional part print without one (`123.0` is `"123"`),
/// so the broker sees the same id `normalize` compares against.
fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15
}

fn truncate(f: f64) -> i64 {
    if f.is_finite() { f.trunc() as i64 } else { 0 }
}

fn parse_loose(s: &str) -> i64 {
    let s = s.trim_start_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']);
    let whole = s.trim_end();
    if let Ok(i) = whole.parse::<i64>() {
        return i;
    }
    if let Ok(f) = whole.parse::<f64>() {
        return truncate(f);
    }

    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    s[..end].parse().unwrap_or(0)
}
