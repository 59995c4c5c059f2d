//! Query parameter sanitation

use crate::types::JsonValue;

/// Strip empty filters from a parameter tree before it reaches the server.
///
/// Deletes object keys whose value is `""` or `null`, recursing into nested
/// plain objects first. Arrays pass through untouched, empty elements and
/// all; so do non-object inputs. An object emptied of every key is retained.
/// Idempotent.
pub fn remove_empty_params(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut kept = serde_json::Map::with_capacity(map.len());
            for (key, child) in map {
                let child = if child.is_object() {
                    remove_empty_params(child)
                } else {
                    child
                };
                match &child {
                    JsonValue::Null => {}
                    JsonValue::String(s) if s.is_empty() => {}
                    _ => {
                        kept.insert(key, child);
                    }
                }
            }
            JsonValue::Object(kept)
        }
        other => other,
    }
}
