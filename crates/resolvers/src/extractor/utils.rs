//! Defensive accessors for weakly-typed provider payloads.
//!
//! Providers return inconsistent, partially-populated records; no
//! field beyond the minimal envelope may be assumed present or of a
//! fixed type. These helpers return `Option` instead of panicking on
//! shape drift.

use serde_json::Value;

/// Non-empty string at `key`, if present and actually a string.
pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Unsigned integer at `key`; tolerates numeric strings, which some
/// providers emit for byte sizes.
pub(crate) fn u64_field(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// A string that may be delivered bare or as the first element of an
/// array (`"url"` vs `["url", ...]`).
pub(crate) fn string_or_first(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Array(items) => items.iter().find_map(|v| v.as_str().filter(|s| !s.is_empty())),
        _ => None,
    }
}

/// Unescape a JSON-string-escaped URL scraped out of inline page
/// data (`https:\/\/...`, `%` escapes).
pub(crate) fn unescape_json_string(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.replace("\\/", "/"))
}
