//! Lenient field decoding for order files
//!
//! Order snapshots come from outside systems. A malformed optional field
//! degrades to its default (and a warning) instead of rejecting the file.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::pipeline::OrderStatus;

fn decode_or_default<T: DeserializeOwned + Default>(raw: &Value) -> T {
    match T::deserialize(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(value = %raw, error = %err, "malformed order field; using default");
            T::default()
        }
    }
}

/// Decode the field, falling back to `T::default()` on a bad value
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(decode_or_default(&raw))
}

/// Status identifier; anything that is not a string reads as `Unknown`
pub fn status<'de, D>(deserializer: D) -> Result<OrderStatus, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(OrderStatus::parse_lenient(&s)),
        other => {
            tracing::warn!(value = %other, "order status is not a string; treating as unknown");
            Ok(OrderStatus::Unknown)
        }
    }
}

/// Keep the well-formed entries of a list, dropping the rest
pub fn valid_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    let Value::Array(items) = raw else {
        if !raw.is_null() {
            tracing::warn!(value = %raw, "expected a list; ignoring");
        }
        return Ok(Vec::new());
    };

    Ok(items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(entry = %item, error = %err, "dropping malformed list entry");
                None
            }
        })
        .collect())
}
