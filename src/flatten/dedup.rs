use serde_json::Value;
use std::collections::HashSet;

/// Keep the first record seen for each distinct value of `identity`.
///
/// Records that are not objects, lack the field, or carry a falsy value
/// pass through untouched and never enter the seen-set.
pub fn dedupe_by_field(records: Vec<Value>, identity: &str) -> Vec<Value> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());

    for record in records {
        let fingerprint = record
            .get(identity)
            .filter(|v| is_truthy(v))
            .map(|v| v.to_string());

        match fingerprint {
            Some(id) => {
                if seen.insert(id) {
                    kept.push(record);
                }
            }
            None => kept.push(record),
        }
    }

    kept
}

/// JSON truthiness: null, false, zero and empty containers are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_seen_wins() {
        let records = vec![
            json!({"id": 1, "v": "first"}),
            json!({"id": 2, "v": "second"}),
            json!({"id": 1, "v": "third"}),
        ];

        let out = dedupe_by_field(records, "id");
        assert_eq!(out, vec![json!({"id": 1, "v": "first"}), json!({"id": 2, "v": "second"})]);
    }

    #[test]
    fn test_missing_identity_is_kept() {
        let out = dedupe_by_field(vec![json!({}), json!({})], "id");
        assert_eq!(out, vec![json!({}), json!({})]);
    }

    #[test]
    fn test_falsy_identity_is_kept() {
        let records = vec![
            json!({"title": ""}),
            json!({"title": ""}),
            json!({"title": null}),
            json!("not a record"),
        ];
        assert_eq!(dedupe_by_field(records.clone(), "title"), records);
    }

    #[test]
    fn test_numbers_and_strings_are_distinct() {
        let out = dedupe_by_field(vec![json!({"id": 1}), json!({"id": "1"})], "id");
        assert_eq!(out.len(), 2);
    }
}
