//! Pre-decode reshaping of dynamically keyed payloads.
//!
//! The members endpoint sends `players` as an object keyed by player name:
//!
//! ```json
//! {"players": {"Nick_Name": {"id": 1, "isOnline": true, ...}, ...}}
//! ```
//!
//! [`pivot_keyed_records`] turns such an object into a list of records, each
//! carrying its original key under a chosen field, so the list can be decoded
//! with plain serde derives.

use serde_json::{Map, Value};
use tracing::debug;

/// Pivot `{key: {..record..}}` into `[{<key_field>: key, ..record..}]`.
///
/// Output order follows the object's key order. Entries whose value is not
/// an object are meta entries and are skipped. A value that is not an object
/// at all yields an empty list.
pub fn pivot_keyed_records(object: &Value, key_field: &str) -> Vec<Value> {
    let Some(map) = object.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(key, record)| match record {
            Value::Object(fields) => {
                let mut flat = Map::with_capacity(fields.len() + 1);
                flat.insert(key_field.to_owned(), Value::String(key.clone()));
                for (name, value) in fields {
                    if name != key_field {
                        flat.insert(name.clone(), value.clone());
                    }
                }
                Some(Value::Object(flat))
            }
            _ => {
                debug!(key = %key, "skipping non-record entry while reshaping");
                None
            }
        })
        .collect()
}

/// Replace `payload[field]` with its pivoted list, in place.
///
/// Does nothing if `payload` is not an object or has no `field`. An existing
/// array is left as is.
pub fn reshape_field(payload: &mut Value, field: &str, key_field: &str) {
    let Some(slot) = payload.as_object_mut().and_then(|map| map.get_mut(field)) else {
        return;
    };
    if slot.is_object() {
        let records = pivot_keyed_records(slot, key_field);
        *slot = Value::Array(records);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pivot_preserves_key_order_and_adds_username() {
        let players = json!({
            "Zed_Last": {"id": 3, "rank": 1},
            "Alpha_First": {"id": 1, "rank": 9},
            "Mid_Name": {"id": 2, "rank": 5},
        });
        let list = pivot_keyed_records(&players, "username");
        let names: Vec<&str> = list
            .iter()
            .map(|p| p["username"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Zed_Last", "Alpha_First", "Mid_Name"]);
        assert_eq!(list[1]["rank"], 9);
    }

    #[test]
    fn pivot_skips_meta_entries() {
        let players = json!({
            "count": 2,
            "A_B": {"id": 1},
            "updated": "yesterday",
            "C_D": {"id": 2},
        });
        let list = pivot_keyed_records(&players, "username");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["username"], "A_B");
        assert_eq!(list[1]["username"], "C_D");
    }

    #[test]
    fn key_wins_over_nested_username() {
        let players = json!({"Real_Key": {"username": "stale"}});
        let list = pivot_keyed_records(&players, "username");
        assert_eq!(list[0]["username"], "Real_Key");
        assert_eq!(list[0].as_object().unwrap().len(), 1);
    }

    #[test]
    fn pivot_of_non_object_is_empty() {
        assert!(pivot_keyed_records(&json!([1, 2]), "username").is_empty());
        assert!(pivot_keyed_records(&json!(null), "username").is_empty());
    }

    #[test]
    fn reshape_field_rewrites_in_place() {
        let mut payload = json!({"serverName": "x", "players": {"A_B": {"id": 1}}});
        reshape_field(&mut payload, "players", "username");
        assert_eq!(payload["players"], json!([{"username": "A_B", "id": 1}]));
        assert_eq!(payload["serverName"], "x");
    }

    #[test]
    fn reshape_field_leaves_arrays_and_missing_fields() {
        let mut payload = json!({"players": [{"username": "A_B"}]});
        reshape_field(&mut payload, "players", "username");
        assert_eq!(payload["players"], json!([{"username": "A_B"}]));

        let mut empty = json!({"other": 1});
        reshape_field(&mut empty, "players", "username");
        assert_eq!(empty, json!({"other": 1}));
    }

    #[test]
    fn reshape_is_deterministic() {
        let players = json!({"B": {"id": 2}, "A": {"id": 1}});
        assert_eq!(
            pivot_keyed_records(&players, "username"),
            pivot_keyed_records(&players, "username")
        );
    }
}
