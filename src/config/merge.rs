// src/config/merge.rs

//! Right-biased deep merge over JSON values.
//!
//! Law: merging `overlay` into `base` never drops a leaf value present in
//! `overlay`. Objects merge key-wise and recursively; any other pair of
//! values (including arrays) is replaced wholesale by the overlay.

use serde_json::Value;

/// Merge `overlay` into `base`, overlay values winning at every level.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Convenience: merge and return the result.
pub fn merged(mut base: Value, overlay: Value) -> Value {
    deep_merge(&mut base, overlay);
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overlay_wins_at_nested_leaves() {
        let base = json!({"a": {"b": 1, "c": 2}, "d": true});
        let overlay = json!({"a": {"b": 10}});

        let result = merged(base, overlay);
        assert_eq!(result, json!({"a": {"b": 10, "c": 2}, "d": true}));
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let base = json!({"reporters": ["text", "lcov"]});
        let overlay = json!({"reporters": ["clover"]});

        let result = merged(base, overlay);
        assert_eq!(result, json!({"reporters": ["clover"]}));
    }

    #[test]
    fn new_keys_are_inserted() {
        let result = merged(json!({"a": 1}), json!({"b": {"c": 2}}));
        assert_eq!(result, json!({"a": 1, "b": {"c": 2}}));
    }
}
