//! Forgiving field deserializers for model payloads written by a language model.
//!
//! Every function here accepts `null` or a missing value as "empty" and never
//! fails on a malformed list item; bad items are dropped instead.

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;

/// A list of structured items. A lone object is read as a one-item list.
pub(super) fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// A list of strings. Accepts a comma-separated string, numbers, and
/// `{"name": .., "type": ..}` objects.
pub(super) fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.iter().filter_map(coerce_string).collect(),
        Some(Value::String(raw)) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
        Some(other) => coerce_string(&other).into_iter().collect(),
        None => Vec::new(),
    })
}

/// A required scalar rendered as a string.
pub(super) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    coerce_string(&value).ok_or_else(|| D::Error::custom("expected a string"))
}

/// An optional scalar; absent or unusable values become `""`.
pub(super) fn opt_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(coerce_string)
        .unwrap_or_default())
}

pub(super) fn boolean<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
        _ => false,
    })
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => {
            let name = map.get("name").and_then(Value::as_str)?.trim();
            if name.is_empty() {
                return None;
            }
            match map.get("type").and_then(Value::as_str).map(str::trim) {
                Some(ty) if !ty.is_empty() => Some(format!("{name}: {ty}")),
                _ => Some(name.to_owned()),
            }
        }
        Value::Null | Value::Array(_) => None,
    }
}
