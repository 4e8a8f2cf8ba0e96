//! Deep merge of configuration layers (defaults, file, command line).
//!
//! Objects merge key by key; anything else in a later layer replaces what
//! came before, including arrays and explicit nulls.

use serde_json::{Map, Value};

/// Merge `overlay` onto `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => Value::Object(merge_maps(base, overlay)),
        (_, overlay) => overlay,
    }
}

fn merge_maps(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in overlay {
        let merged = match base.remove(&key) {
            Some(existing) => deep_merge(existing, value),
            None => value,
        };
        base.insert(key, merged);
    }
    base
}

/// Fold layers lowest precedence first.
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}
