//! Pipeline configuration
//!
//! One immutable [`PipelineConfig`] carries every table the stages need.
//! It can be loaded from a JSON file; any section or field left out falls
//! back to the built-in kill team defaults.

use crate::flatten::FlattenConfig;
use crate::report::ReportConfig;
use crate::sanitize::CleanPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the roster JSON comes from and what to drop before flattening
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Attribute carrying the HTML-escaped JSON blob
    pub embedded_attribute: String,

    /// Top-level keys removed before flattening
    pub keys_to_ignore: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            embedded_attribute: String::from("killteam"),
            keys_to_ignore: vec![String::from("rosters")],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub flatten: FlattenConfig,
    pub sanitize: CleanPolicy,
    pub report: ReportConfig,
}

impl PipelineConfig {
    /// Read a config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Config file when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.source.embedded_attribute, "killteam");
        assert_eq!(config.source.keys_to_ignore, vec!["rosters"]);
        assert_eq!(config.flatten.flatten_targets[0].parent, "operatives");
        assert_eq!(config.flatten.dedup_key_by_child_key["weapons"], "wepname");
        assert!(config.sanitize.is_blocked("button"));
    }

    #[test]
    fn test_partial_file_overrides_only_named_fields() {
        let path = std::env::temp_dir().join("ktroster_config_partial.json");
        std::fs::write(
            &path,
            r#"{
                "source": {"keys_to_ignore": []},
                "flatten": {"flatten_targets": [{"parent": "squads", "children": ["members"]}]},
                "sanitize": {"tag_mode": "collapse", "blocked_tags": ["form"]}
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.source.embedded_attribute, "killteam");
        assert!(config.source.keys_to_ignore.is_empty());
        assert_eq!(config.flatten.flatten_targets.len(), 1);
        assert_eq!(config.flatten.dedup_key_by_child_key["abilities"], "title");
        assert!(config.sanitize.is_blocked("form"));
        assert!(!config.sanitize.is_blocked("button"));
        assert_eq!(config.report.title_suffix, "Kill Team Overview");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = PipelineConfig::load(Some(Path::new("/nonexistent/ktroster.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
