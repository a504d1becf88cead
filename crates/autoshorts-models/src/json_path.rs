//! Safe lookups into loosely-typed API payloads.
//!
//! Every access into a raw Data API response goes through these helpers, so
//! a missing key or an unexpected shape produces `None` instead of a panic.

use serde_json::Value;

/// One step of a nested lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKey<'a> {
    /// Object member by name.
    Key(&'a str),
    /// Array element by position.
    Index(usize),
}

impl<'a> From<&'a str> for PathKey<'a> {
    fn from(key: &'a str) -> Self {
        PathKey::Key(key)
    }
}

impl From<usize> for PathKey<'_> {
    fn from(index: usize) -> Self {
        PathKey::Index(index)
    }
}

/// Walk `value` through object keys.
///
/// Returns `None` as soon as a key is missing or an intermediate value is
/// not an object. An empty key list returns the input itself.
pub fn safe_get<'v>(value: &'v Value, keys: &[&str]) -> Option<&'v Value> {
    keys.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// Like [`safe_get`], but each step may also index into an array.
pub fn safe_get_path<'v>(value: &'v Value, path: &[PathKey<'_>]) -> Option<&'v Value> {
    path.iter().try_fold(value, |current, step| match step {
        PathKey::Key(key) => current.as_object()?.get(*key),
        PathKey::Index(index) => current.as_array()?.get(*index),
    })
}

/// String at `keys`, ignoring JSON `null`.
pub fn get_string(value: &Value, keys: &[&str]) -> Option<String> {
    safe_get(value, keys)?.as_str().map(str::to_owned)
}

pub fn get_bool(value: &Value, keys: &[&str]) -> Option<bool> {
    safe_get(value, keys)?.as_bool()
}

/// Non-negative count at `keys`.
///
/// The Data API encodes counts as decimal strings; plain JSON numbers are
/// accepted as well.
pub fn get_count(value: &Value, keys: &[&str]) -> Option<u64> {
    match safe_get(value, keys)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn get_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    match safe_get(value, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// List of strings at `keys`; non-string elements are skipped and a missing
/// list yields an empty vector.
pub fn get_string_list(value: &Value, keys: &[&str]) -> Vec<String> {
    safe_get(value, keys)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}
