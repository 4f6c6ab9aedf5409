//! # ktroster - roster export to JSON and HTML
//!
//! Turns a kill team roster export (HTML-escaped JSON embedded in an HTML
//! attribute) into flattened JSON and a styled static report, and strips
//! arbitrary HTML pages down to minimal, attribute-free documents.
//!
//! ## Modules
//!
//! - **flatten**: Lift nested child sequences into top-level keys, with dedup
//! - **sanitize**: Rebuild HTML without attributes, comments or blocked tags
//! - **roster**: Embedded JSON extraction, key removal and document loading
//! - **report**: Render a flattened roster as an HTML report
//! - **config**: The single [`PipelineConfig`] every stage reads
//!
//! ## Quick Start
//!
//! ### Flattening
//!
//! ```rust
//! use ktroster::flatten::{FlattenConfig, FlattenTarget, JsonFlattener};
//! use serde_json::json;
//!
//! let data = json!({
//!     "fireteams": [
//!         {"operatives": [{"opname": "Gunner"}]},
//!         {"operatives": [{"opname": "Leader"}]}
//!     ]
//! });
//!
//! let config = FlattenConfig::with_targets(vec![FlattenTarget::new("fireteams", &["operatives"])]);
//! let flat = JsonFlattener::new(config).flatten(data);
//!
//! assert_eq!(flat["fireteams_operatives"].as_array().unwrap().len(), 2);
//! ```
//!
//! ### Sanitizing
//!
//! ```rust
//! use ktroster::sanitize::{clean_fragment, CleanPolicy};
//!
//! let nodes = clean_fragment("<div class='x'>Hi<button>Go</button></div>", &CleanPolicy::default());
//! assert_eq!(nodes[0].to_html(), "<div>Hi</div>");
//! ```

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

pub mod config;
pub mod error;
pub mod flatten;
pub mod report;
pub mod roster;
pub mod sanitize;
pub mod writer;

// Re-export commonly used types for convenience
pub use config::{PipelineConfig, SourceConfig};
pub use error::PipelineError;
pub use flatten::{FlattenConfig, FlattenTarget, JsonFlattener};
pub use report::{render_report, ReportConfig};
pub use roster::{clean_and_flatten, extract_embedded_json, load_document, remove_keys};
pub use sanitize::{clean_element, extract_and_render, CleanNode, CleanPolicy, ExtractOptions};
pub use writer::{write_html_file, write_json_file, JsonWriter};

/// Main entry point: load a roster, flatten it and write the report.
///
/// Returns the flattened document so callers can keep or inspect it.
pub fn build_report(input: &Path, output: &Path, config: &PipelineConfig) -> Result<serde_json::Value> {
    let document = load_document(input, &config.source)
        .with_context(|| format!("Failed to load roster from {}", input.display()))?;
    let flattened = clean_and_flatten(document, config);

    let html = render_report(&flattened, &config.report);
    write_html_file(output, &html)?;
    info!("Wrote report to {}", output.display());

    Ok(flattened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fireteam_roster_end_to_end() {
        let dir = std::env::temp_dir().join("ktroster_end_to_end");
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("roster.json");
        let output = dir.join("report.html");

        let roster = json!({
            "killteamname": "Kasrkin",
            "killteamid": "kas",
            "rosters": [{"huge": "blob"}],
            "fireteams": [
                {"operatives": [{
                    "opname": "Sergeant", "M": "3", "APL": "2", "SV": "4+", "W": "8",
                    "keywords": "IMPERIUM, KASRKIN",
                    "abilities": [{"title": "Skill at Arms", "description": "Reroll"}],
                    "weapons": [{"wepname": "Hot-shot lasgun", "weptype": "R",
                                 "profiles": [{"A": "4", "BS": "3+", "D": "3/4", "SR": "-"}]}]
                }]},
                {"operatives": [{
                    "opname": "Gunner", "M": "3", "APL": "2", "SV": "4+", "W": "8",
                    "abilities": [{"title": "Skill at Arms", "description": "Reroll"}],
                    "weapons": [{"wepname": "Hot-shot lasgun", "weptype": "R", "profiles": []}]
                }]}
            ]
        });
        std::fs::write(&input, roster.to_string()).unwrap();

        let flat = build_report(&input, &output, &PipelineConfig::default()).unwrap();

        assert!(flat.get("rosters").is_none());
        assert_eq!(flat["operatives_abilities"], json!([{"title": "Skill at Arms", "description": "Reroll"}]));
        assert_eq!(flat["operatives_weapons"].as_array().unwrap().len(), 1);
        assert_eq!(flat["fireteams_operatives"].as_array().unwrap().len(), 2);

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Kasrkin - Kill Team Overview"));
        assert!(html.contains("Sergeant"));
        assert!(html.contains("Hot-shot lasgun"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let dir = std::env::temp_dir().join("ktroster_missing_input");
        let output = dir.join("report.html");

        let err = build_report(&dir.join("absent.html"), &output, &PipelineConfig::default()).unwrap_err();

        assert!(err.to_string().contains("Failed to load roster"));
        assert!(!output.exists());
    }
}
