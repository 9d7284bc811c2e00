// ABOUTME: Derives stable cache keys from tool parameters.
// ABOUTME: SHA-256 over the tool id and a key-sorted JSON rendering.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Digest of `tool` and `params`, stable under object key reordering.
pub fn cache_key(tool: &str, params: &Value) -> String {
    let canonical = canonicalize(params).to_string();

    let mut hasher = Sha256::new();
    hasher.update(tool.as_bytes());
    hasher.update([0u8]);
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_key_is_hex_sha256() {
        let key = cache_key("analyze", &json!({"path": "src"}));
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_ignores_object_key_order() {
        let a = cache_key("analyze", &json!({"path": "src", "depth": 2, "opts": {"x": 1, "y": 2}}));
        let b = cache_key("analyze", &json!({"opts": {"y": 2, "x": 1}, "depth": 2, "path": "src"}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_differs_by_tool_and_params() {
        let params = json!({"path": "src"});
        assert_ne!(cache_key("analyze", &params), cache_key("report", &params));
        assert_ne!(
            cache_key("analyze", &params),
            cache_key("analyze", &json!({"path": "tests"}))
        );
    }

    #[test]
    fn test_array_order_is_significant() {
        assert_ne!(
            cache_key("t", &json!({"items": [1, 2]})),
            cache_key("t", &json!({"items": [2, 1]}))
        );
    }
}
