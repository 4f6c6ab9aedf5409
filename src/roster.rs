//! Roster loading - pull the embedded JSON out of an export page, drop the
//! keys nobody renders, and run the flattener over what remains.

use crate::config::{PipelineConfig, SourceConfig};
use crate::error::PipelineError;
use crate::flatten::JsonFlattener;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Leading `name=` of a bare attribute snippet such as `killteam="{...}"`
static SNIPPET_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^([A-Za-z_:][-\w:.]*)\s*=\s*["']"#).unwrap());

/// Find the first element carrying `attribute` and parse its decoded value
/// as JSON.
///
/// A bare `attribute="..."` snippet (no surrounding element) is accepted as
/// well. Character references such as `&quot;` are decoded by the HTML
/// parser before the JSON is read.
pub fn extract_embedded_json(html: &str, attribute: &str) -> Result<Value, PipelineError> {
    let missing = || PipelineError::MissingAttribute {
        attribute: attribute.to_string(),
    };

    let raw = match find_attribute(&Html::parse_document(html), attribute)? {
        Some(raw) => raw,
        None => {
            let trimmed = html.trim();
            let is_snippet = SNIPPET_ATTRIBUTE
                .captures(trimmed)
                .map_or(false, |caps| caps[1].eq_ignore_ascii_case(attribute));
            if !is_snippet {
                return Err(missing());
            }
            debug!("Reading '{}' from a bare attribute snippet", attribute);
            let wrapped = Html::parse_fragment(&format!("<div {trimmed}></div>"));
            find_attribute(&wrapped, attribute)?.ok_or_else(missing)?
        }
    };

    Ok(serde_json::from_str(&raw)?)
}

fn find_attribute(html: &Html, attribute: &str) -> Result<Option<String>, PipelineError> {
    let selector = Selector::parse(&format!("[{attribute}]")).map_err(|_| {
        PipelineError::MissingAttribute {
            attribute: attribute.to_string(),
        }
    })?;
    Ok(html
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attribute))
        .map(str::to_string))
}

/// Drop the named top-level keys; anything that is not a mapping is
/// returned as is.
pub fn remove_keys(document: Value, keys: &[String]) -> Value {
    match document {
        Value::Object(mut map) => {
            for key in keys {
                if map.remove(key).is_some() {
                    debug!(key = %key, "Removed top-level key");
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Read a roster from disk.
///
/// `.html`/`.htm` files (and anything that does not look like JSON) go
/// through [`extract_embedded_json`]; everything else is parsed directly.
pub fn load_document(path: &Path, source: &SourceConfig) -> Result<Value, PipelineError> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::from_io(path, e))?;

    let is_html = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
    let looks_like_json = matches!(content.trim_start().chars().next(), Some('{') | Some('['));

    if is_html || !looks_like_json {
        info!("Extracting '{}' JSON from {}", source.embedded_attribute, path.display());
        extract_embedded_json(&content, &source.embedded_attribute)
    } else {
        info!("Reading JSON from {}", path.display());
        Ok(serde_json::from_str(&content)?)
    }
}

/// Remove ignored keys and flatten, the stage between loading and rendering
pub fn clean_and_flatten(document: Value, config: &PipelineConfig) -> Value {
    let cleaned = remove_keys(document, &config.source.keys_to_ignore);
    let flattener = JsonFlattener::new(config.flatten.clone());
    let flattened = flattener.flatten(cleaned);
    info!(
        "Flattened {} target(s)",
        config.flatten.flatten_targets.len()
    );
    flattened
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_entity_escaped_attribute() {
        let html = r#"<html><body><div id="x" killteam="{&quot;killteamname&quot;:&quot;Pathfinders &amp; Co&quot;,&quot;n&quot;:[1,2]}"></div></body></html>"#;

        let value = extract_embedded_json(html, "killteam").unwrap();

        assert_eq!(value, json!({"killteamname": "Pathfinders & Co", "n": [1, 2]}));
    }

    #[test]
    fn test_first_element_wins() {
        let html = r#"<p killteam='{"a":1}'></p><p killteam='{"a":2}'></p>"#;
        assert_eq!(extract_embedded_json(html, "killteam").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_bare_snippet() {
        let snippet = "  killteam=\"{&quot;killteamid&quot;:&quot;KASRKIN&quot;}\"\n";
        let value = extract_embedded_json(snippet, "killteam").unwrap();
        assert_eq!(value, json!({"killteamid": "KASRKIN"}));
    }

    #[test]
    fn test_missing_attribute() {
        let err = extract_embedded_json("<div data-x='1'></div>", "killteam").unwrap_err();
        assert!(matches!(err, PipelineError::MissingAttribute { ref attribute } if attribute == "killteam"));

        let err = extract_embedded_json("other=\"{}\"", "killteam").unwrap_err();
        assert!(matches!(err, PipelineError::MissingAttribute { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = extract_embedded_json("<div killteam=\"{not json\"></div>", "killteam").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedJson { .. }));
    }

    #[test]
    fn test_remove_keys_drops_only_named() {
        let doc = json!({"rosters": [1], "killteamname": "X", "nested": {"rosters": 2}});
        let cleaned = remove_keys(doc, &["rosters".to_string(), "absent".to_string()]);
        assert_eq!(cleaned, json!({"killteamname": "X", "nested": {"rosters": 2}}));

        assert_eq!(remove_keys(json!([1, 2]), &["rosters".to_string()]), json!([1, 2]));
    }

    #[test]
    fn test_load_document_by_extension() {
        let dir = std::env::temp_dir().join("ktroster_roster_load");
        std::fs::create_dir_all(&dir).unwrap();
        let html_path = dir.join("team.html");
        let json_path = dir.join("team.json");
        std::fs::write(&html_path, r#"<div killteam="{&quot;a&quot;:1}"></div>"#).unwrap();
        std::fs::write(&json_path, r#"{"b": 2}"#).unwrap();

        let source = SourceConfig::default();
        assert_eq!(load_document(&html_path, &source).unwrap(), json!({"a": 1}));
        assert_eq!(load_document(&json_path, &source).unwrap(), json!({"b": 2}));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_document(Path::new("/nonexistent/team.html"), &SourceConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::SourceNotFound { .. }));
    }

    #[test]
    fn test_clean_and_flatten() {
        let doc = json!({
            "rosters": [{"big": true}],
            "fireteams": [
                {"operatives": [{"opname": "Gunner", "weapons": [{"wepname": "Bolter"}]}]},
                {"operatives": [{"opname": "Leader", "weapons": [{"wepname": "Bolter"}, {"wepname": "Sword"}]}]}
            ]
        });

        let result = clean_and_flatten(doc, &PipelineConfig::default());

        assert!(result.get("rosters").is_none());
        assert_eq!(result["operatives_weapons"], json!([{"wepname": "Bolter"}, {"wepname": "Sword"}]));
        assert_eq!(result["fireteams_operatives"].as_array().unwrap().len(), 2);
        assert_eq!(result["operatives_abilities"], json!([]));
    }
}
