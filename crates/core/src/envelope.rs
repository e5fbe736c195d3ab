//! Tolerant list extraction for Akamai response envelopes
//!
//! The same kind of list arrives in several shapes depending on the API and the
//! account: `{"key": {"items": [...]}}`, `{"key": [...]}`, `{"items": [...]}` or a
//! bare array. These helpers take the raw JSON and return the list.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Pull the list out of `value`, trying each key in order and then `items`.
///
/// Returns an empty list when nothing list-like is found.
pub fn extract_items(value: &Value, keys: &[&str]) -> Vec<Value> {
    if let Value::Array(items) = value {
        return items.clone();
    }

    let Value::Object(map) = value else {
        return Vec::new();
    };

    for key in keys.iter().copied().chain(std::iter::once("items")) {
        match map.get(key) {
            Some(Value::Array(items)) if !items.is_empty() => return items.clone(),
            Some(Value::Object(inner)) => {
                if let Some(Value::Array(items)) = inner.get("items") {
                    if !items.is_empty() {
                        return items.clone();
                    }
                }
            }
            _ => {}
        }
    }

    Vec::new()
}

/// Like [`extract_items`], deserializing each element and skipping the ones that
/// don't fit `T`.
pub fn parse_items<T: DeserializeOwned>(value: &Value, keys: &[&str]) -> Vec<T> {
    extract_items(value, keys)
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}
