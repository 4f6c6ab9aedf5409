use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One parent key and the child keys to lift out of its records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenTarget {
    /// Key whose value is a sequence of records, e.g. "operatives"
    pub parent: String,

    /// Keys inside each record whose sequences get concatenated, e.g. "weapons"
    pub children: Vec<String>,
}

impl FlattenTarget {
    pub fn new(parent: impl Into<String>, children: &[&str]) -> Self {
        FlattenTarget {
            parent: parent.into(),
            children: children.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Configuration for the flattening process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenConfig {
    /// Targets processed in order; later targets see earlier synthesized keys
    pub flatten_targets: Vec<FlattenTarget>,

    /// Child key -> identity field used to drop repeated records
    pub dedup_key_by_child_key: HashMap<String, String>,

    /// Separator between parent and child in synthesized key names
    pub separator: String,
}

impl FlattenConfig {
    /// Config with the given targets and no deduplication
    pub fn with_targets(flatten_targets: Vec<FlattenTarget>) -> Self {
        FlattenConfig {
            flatten_targets,
            dedup_key_by_child_key: HashMap::new(),
            separator: String::from("_"),
        }
    }

    pub fn with_dedup_key(mut self, child: impl Into<String>, identity: impl Into<String>) -> Self {
        self.dedup_key_by_child_key.insert(child.into(), identity.into());
        self
    }

    /// Name of the top-level key a (parent, child) pair is stored under
    pub fn synthesized_key(&self, parent: &str, child: &str) -> String {
        format!("{}{}{}", parent, self.separator, child)
    }
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig::with_targets(vec![
            FlattenTarget::new("operatives", &["abilities", "weapons", "uniqueactions"]),
            FlattenTarget::new("fireteams", &["operatives"]),
        ])
        .with_dedup_key("abilities", "title")
        .with_dedup_key("weapons", "wepname")
        .with_dedup_key("uniqueactions", "title")
    }
}
