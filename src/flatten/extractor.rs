use crate::flatten::dedup::dedupe_by_field;
use crate::flatten::types::FlattenConfig;
use serde_json::Value;
use tracing::{debug, warn};

/// Lifts scattered child sequences into top-level keys
pub struct JsonFlattener {
    config: FlattenConfig,
}

impl JsonFlattener {
    pub fn new(config: FlattenConfig) -> Self {
        JsonFlattener { config }
    }

    /// Flatten every configured (parent, child) pair into `document`.
    ///
    /// Each pair writes `"{parent}_{child}"` at the top level, replacing any
    /// previous value, so running this twice yields the same lists.
    pub fn flatten(&self, mut document: Value) -> Value {
        if !document.is_object() {
            warn!("document root is not an object; nothing to flatten into");
            return document;
        }

        for target in &self.config.flatten_targets {
            for child in &target.children {
                let mut collected = Vec::new();
                Self::collect(&document, &target.parent, child, &mut collected);

                let found = collected.len();
                if let Some(identity) = self.config.dedup_key_by_child_key.get(child) {
                    collected = dedupe_by_field(collected, identity);
                }

                let key = self.config.synthesized_key(&target.parent, child);
                debug!(key = %key, found, kept = collected.len(), "flattened");

                if let Value::Object(map) = &mut document {
                    map.insert(key, Value::Array(collected));
                }
            }
        }

        document
    }

    /// Gather the contents of `child` from every record under a `parent` sequence
    pub fn find_and_flatten(document: &Value, parent: &str, child: &str) -> Vec<Value> {
        let mut found = Vec::new();
        Self::collect(document, parent, child, &mut found);
        found
    }

    /// Depth-first walk. A matched `parent` sequence is harvested, not descended into.
    fn collect(value: &Value, parent: &str, child: &str, found: &mut Vec<Value>) {
        match value {
            Value::Object(obj) => {
                for (key, nested) in obj {
                    match nested {
                        Value::Array(records) if key == parent => {
                            Self::harvest(records, child, found);
                        }
                        _ => Self::collect(nested, parent, child, found),
                    }
                }
            }
            Value::Array(arr) => {
                for item in arr {
                    Self::collect(item, parent, child, found);
                }
            }
            _ => {}
        }
    }

    fn harvest(records: &[Value], child: &str, found: &mut Vec<Value>) {
        for record in records {
            // Only sequence-valued children are concatenated
            if let Some(Value::Array(items)) = record.get(child) {
                found.extend(items.iter().cloned());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::types::FlattenTarget;
    use serde_json::json;

    fn flattener(targets: Vec<FlattenTarget>) -> JsonFlattener {
        JsonFlattener::new(FlattenConfig::with_targets(targets))
    }

    #[test]
    fn test_two_level_document() {
        let input = json!({
            "fireteams": [
                {"operatives": [{"name": "A"}, {"name": "B"}]}
            ]
        });

        let out = flattener(vec![FlattenTarget::new("fireteams", &["operatives"])]).flatten(input);

        assert_eq!(out["fireteams_operatives"], json!([{"name": "A"}, {"name": "B"}]));
        // Original key is left alone
        assert_eq!(out["fireteams"][0]["operatives"][0]["name"], "A");
    }

    #[test]
    fn test_parent_nested_inside_sequence() {
        let input = json!({
            "teams": [
                {"squad": {"operatives": [{"weapons": [{"wepname": "Bolter"}]}]}},
                {"squad": {"operatives": [{"weapons": [{"wepname": "Blade"}]}]}}
            ]
        });

        let found = JsonFlattener::find_and_flatten(&input, "operatives", "weapons");
        assert_eq!(found, vec![json!({"wepname": "Bolter"}), json!({"wepname": "Blade"})]);
    }

    #[test]
    fn test_non_sequence_parent_contributes_nothing() {
        let input = json!({"operatives": {"not": "a list"}});

        let out = flattener(vec![FlattenTarget::new("operatives", &["weapons"])]).flatten(input);
        assert_eq!(out["operatives_weapons"], json!([]));
    }

    #[test]
    fn test_records_without_child_are_skipped() {
        let input = json!({
            "operatives": [
                {"opname": "Leader"},
                {"opname": "Gunner", "weapons": [{"wepname": "Gun"}]},
                "stray scalar"
            ]
        });

        let found = JsonFlattener::find_and_flatten(&input, "operatives", "weapons");
        assert_eq!(found, vec![json!({"wepname": "Gun"})]);
    }

    #[test]
    fn test_deduplication_by_identity() {
        let input = json!({
            "operatives": [
                {"weapons": [{"wepname": "Gun", "A": 4}, {"wepname": "Knife"}]},
                {"weapons": [{"wepname": "Gun", "A": 5}, {"note": "no identity"}]}
            ]
        });

        let config = FlattenConfig::with_targets(vec![FlattenTarget::new("operatives", &["weapons"])])
            .with_dedup_key("weapons", "wepname");
        let out = JsonFlattener::new(config).flatten(input);

        assert_eq!(
            out["operatives_weapons"],
            json!([{"wepname": "Gun", "A": 4}, {"wepname": "Knife"}, {"note": "no identity"}])
        );
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let input = json!({
            "fireteams": [
                {"operatives": [{"opname": "A", "abilities": [{"title": "X"}]}]},
                {"operatives": [{"opname": "B", "abilities": [{"title": "Y"}]}]}
            ]
        });

        let flattener = JsonFlattener::new(FlattenConfig::default());
        let once = flattener.flatten(input);
        let twice = flattener.flatten(once.clone());

        assert_eq!(once, twice);
        assert_eq!(twice["operatives_abilities"], json!([{"title": "X"}, {"title": "Y"}]));
        assert_eq!(twice["fireteams_operatives"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_synthesized_key_overwrites_existing() {
        let input = json!({
            "operatives_weapons": ["stale"],
            "operatives": [{"weapons": [{"wepname": "Fresh"}]}]
        });

        let out = flattener(vec![FlattenTarget::new("operatives", &["weapons"])]).flatten(input);
        assert_eq!(out["operatives_weapons"], json!([{"wepname": "Fresh"}]));
    }

    #[test]
    fn test_synthesized_keys_do_not_double_count() {
        let input = json!({
            "fireteams": [{"operatives": [{"gear": [{"n": 1}]}]}]
        });

        // fireteams_operatives is not itself named "operatives", so the
        // second target still only finds the nested list once
        let out = flattener(vec![
            FlattenTarget::new("fireteams", &["operatives"]),
            FlattenTarget::new("operatives", &["gear"]),
        ])
        .flatten(input);

        assert_eq!(out["operatives_gear"], json!([{"n": 1}]));
    }

    #[test]
    fn test_later_targets_read_earlier_synthesized_keys() {
        let input = json!({
            "fireteams": [
                {"operatives": [{"weapons": [{"wepname": "Gun"}]}]},
                {"operatives": [{"weapons": [{"wepname": "Blade"}]}]}
            ]
        });

        let out = flattener(vec![
            FlattenTarget::new("fireteams", &["operatives"]),
            FlattenTarget::new("fireteams_operatives", &["weapons"]),
        ])
        .flatten(input.clone());
        assert_eq!(
            out["fireteams_operatives_weapons"],
            json!([{"wepname": "Gun"}, {"wepname": "Blade"}])
        );

        // The same targets in the opposite order find nothing
        let reversed = flattener(vec![
            FlattenTarget::new("fireteams_operatives", &["weapons"]),
            FlattenTarget::new("fireteams", &["operatives"]),
        ])
        .flatten(input);
        assert_eq!(reversed["fireteams_operatives_weapons"], json!([]));
    }

    #[test]
    fn test_non_object_root_is_returned_unchanged() {
        let input = json!([{"operatives": []}]);
        let out = flattener(vec![FlattenTarget::new("operatives", &["weapons"])]).flatten(input.clone());
        assert_eq!(out, input);
    }
}
