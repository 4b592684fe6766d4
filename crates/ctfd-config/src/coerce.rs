//! Coercion of raw option strings into typed values
//!
//! Environment overrides arrive as plain strings. They are either coerced to
//! a type forced by the [`Schema`] or type-inferred:
//!
//! - `""` becomes null
//! - `"42"` becomes an integer; digits beyond `i64` stay an exact string
//! - `"4.2"` becomes a float
//! - `"yes"`, `"off"`, ... become booleans
//! - anything else stays a string

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::{Value, ValueType};

const TRUTHY: &[&str] = &["y", "yes", "t", "true", "on", "1"];
const FALSY: &[&str] = &["n", "no", "f", "false", "off", "0"];

/// Interpret a string through the truthy/falsy vocabulary (case-insensitive)
pub fn str_to_bool(raw: &str) -> Option<bool> {
    let lower = raw.to_ascii_lowercase();
    if TRUTHY.contains(&lower.as_str()) {
        Some(true)
    } else if FALSY.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Coerce a raw string, honoring a forced type registered for `key`
pub fn process_string_var(raw: &str, key: Option<&str>, schema: &Schema) -> Result<Value> {
    if let Some(ty) = key.and_then(|k| schema.forced_type(k)) {
        return coerce_forced(raw, ty, key.unwrap_or_default());
    }
    Ok(infer(raw))
}

/// Type-inferring coercion. Never fails.
pub fn infer(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }

    if is_ascii_digits(raw) {
        // Too large for i64: keep the digits exact rather than round
        return match raw.parse::<i64>() {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::String(raw.to_string()),
        };
    }

    if is_decimal(raw) {
        if let Ok(f) = raw.parse::<f64>() {
            return Value::Float(f);
        }
    }

    match str_to_bool(raw) {
        Some(b) => Value::Bool(b),
        None => Value::String(raw.to_string()),
    }
}

fn coerce_forced(raw: &str, ty: ValueType, key: &str) -> Result<Value> {
    let got = || format!("string (\"{}\")", raw);
    match ty {
        ValueType::Str => Ok(Value::String(raw.to_string())),
        ValueType::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| Error::parse(key, ty.to_string(), got())),
        ValueType::Float => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| Error::parse(key, ty.to_string(), got())),
        ValueType::Bool => str_to_bool(raw.trim())
            .map(Value::Bool)
            .ok_or_else(|| Error::parse(key, ty.to_string(), got())),
    }
}

/// Boolean coercion for switch-like options.
///
/// `Ok(None)` means "unset" and is only produced for the empty string;
/// an absent or null value reads as `false`.
pub fn process_boolean_str(value: Option<&Value>, path: &str) -> Result<Option<bool>> {
    match value {
        None | Some(Value::Null) => Ok(Some(false)),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => str_to_bool(s)
            .map(Some)
            .ok_or_else(|| Error::parse(path, "boolean", format!("string (\"{}\")", s))),
        // An inferred environment override such as FORCE_HTTPS=1
        Some(Value::Integer(0)) => Ok(Some(false)),
        Some(Value::Integer(1)) => Ok(Some(true)),
        Some(other) => Err(Error::parse(path, "boolean", other.type_name())),
    }
}

/// Replace the empty string with `default`; pass anything else through
pub fn empty_str_cast(value: Value, default: impl Into<Value>) -> Value {
    if value.is_empty_str() {
        default.into()
    } else {
        value
    }
}

fn is_ascii_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Digits with at most one `.` somewhere among them
fn is_decimal(s: &str) -> bool {
    is_ascii_digits(&s.replacen('.', "", 1))
}
