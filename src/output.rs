//! String projection of evaluation results.
//!
//! The mediation engine consumes most expression results as strings (log
//! messages, routing keys, header values), so the projection rules here are
//! part of the language contract:
//!
//! - `Unknown` projects to nothing (`None`), which the engine treats as an
//!   empty result.
//! - Structural results serialize as JSON text with member order preserved.
//! - Floats follow the host engine's formatting convention: plain decimal
//!   with at least one fractional digit for ordinary magnitudes, exponential
//!   notation (`2.0E9`) once the magnitude reaches 10^7 or drops below
//!   10^-3.

use crate::value::{JsonValue, Value};

/// Project a result value to its string form.
///
/// Returns `None` only for [`Value::Unknown`]; every other variant has a
/// defined projection (including `Null`, which projects as `"null"`).
pub fn to_display_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Integer(n) => Some(n.to_string()),
        Value::Float(x) => Some(format_float(*x)),
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            serde_json::to_string(&JsonValue::Array(items.clone()))
                .unwrap_or_else(|_| "[]".to_string()),
        ),
        Value::Object(map) => Some(
            serde_json::to_string(&JsonValue::Object(map.clone()))
                .unwrap_or_else(|_| "{}".to_string()),
        ),
        Value::Unknown => None,
    }
}

/// Exponential form kicks in at this magnitude.
const EXP_UPPER: f64 = 1e7;
/// ...and below this one, for non-zero values.
const EXP_LOWER: f64 = 1e-3;

/// Format a float the way the host engine prints doubles.
///
/// `2.0E9` rather than `2000000000`, `7.0` rather than `7`, `5.2` as is.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = x.abs();
    if magnitude >= EXP_UPPER || (magnitude != 0.0 && magnitude < EXP_LOWER) {
        exponential(x)
    } else {
        let plain = format!("{}", x);
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    }
}

fn exponential(x: f64) -> String {
    // Rust prints "2E9"; the engine's convention wants a fractional digit
    // in the mantissa: "2.0E9".
    let raw = format!("{:E}", x);
    match raw.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{}.0E{}", mantissa, exponent)
        }
        _ => raw,
    }
}
