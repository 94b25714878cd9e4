//! Canonical JSON serialization for deterministic hashing
//!
//! Sorted map keys, no whitespace. Used for model artifacts, dataset content
//! hashes, and memo-cache keys, so byte-identical inputs hash identically
//! across runs and platforms.

use serde::Serialize;
use std::collections::BTreeMap;

/// Serialize a value to canonical JSON (recursively sorted keys, compact).
pub fn to_canonical_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let json_value = serde_json::to_value(value)?;
    serde_json::to_string(&canonicalize_value(&json_value))
}

fn canonicalize_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let btree: BTreeMap<String, serde_json::Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize_value(v)))
                .collect();
            serde_json::Value::Object(btree.into_iter().collect())
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(canonicalize_value).collect())
        }
        other => other.clone(),
    }
}

/// Blake3 hash of the canonical JSON representation, as a hex string.
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let json = to_canonical_json(value)?;
    Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
}
