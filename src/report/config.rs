use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One table column: source field, header label, optional width class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub field: String,
    pub label: String,
    #[serde(default)]
    pub width: Option<String>,
}

impl ColumnSpec {
    pub fn new(field: &str, label: &str, width: &str) -> Self {
        ColumnSpec {
            field: field.to_string(),
            label: label.to_string(),
            width: if width.is_empty() { None } else { Some(width.to_string()) },
        }
    }
}

/// Main field rendered with a bracketed, emphasized companion field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emphasis {
    pub main: String,
    pub extra: String,
}

/// A list section split into team-specific and universal records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSection {
    pub key: String,
    /// Record field compared against the team id
    pub field: String,
    /// Heading suffix for team records, after the report title
    pub team_label: String,
    /// Field value marking records shared by every team
    pub universal_value: String,
    pub universal_title: String,
}

/// Presentation tables for the HTML report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Lower-cased key -> ordered columns
    pub column_config_by_key: HashMap<String, Vec<ColumnSpec>>,

    /// Lower-cased key -> display title
    pub title_override_by_key: HashMap<String, String>,

    /// Fields never shown in generated headers or scalar sections
    pub field_blacklist: BTreeSet<String>,

    /// Top-level sections in render order; empty renders every key
    pub render_order: Vec<String>,

    /// Keys rendered only inside operative cards
    pub skip_render_keys: BTreeSet<String>,

    /// Extra `<h1>` emitted before a section
    pub section_headers: HashMap<String, String>,

    pub emphasize_fields: HashMap<String, Emphasis>,

    /// Horizontal stat table for each operative card
    pub stat_columns: Vec<ColumnSpec>,

    /// Section rendered as operative cards rather than a table
    pub operatives_key: Option<String>,

    pub split_sections: Vec<SplitSection>,

    /// Leave out sections whose value is null, false, 0, "" or empty
    pub skip_falsy: bool,

    /// Document field used as the report title
    pub title_field: Option<String>,

    /// Document field holding the team id, also used for the output file name
    pub team_id_field: Option<String>,

    pub title_suffix: String,

    pub accent_color: String,

    /// Raw HTML placed in a footer before `</body>`
    pub credits_html: Option<String>,
}

impl ReportConfig {
    /// Config for rendering any flattened document: every key, no tables
    /// configured, nothing blacklisted.
    pub fn generic() -> Self {
        ReportConfig {
            column_config_by_key: HashMap::new(),
            title_override_by_key: HashMap::new(),
            field_blacklist: BTreeSet::new(),
            render_order: Vec::new(),
            skip_render_keys: BTreeSet::new(),
            section_headers: HashMap::new(),
            emphasize_fields: HashMap::new(),
            stat_columns: Vec::new(),
            operatives_key: None,
            split_sections: Vec::new(),
            skip_falsy: false,
            title_field: None,
            team_id_field: None,
            title_suffix: String::from("Flattened JSON Viewer"),
            accent_color: String::from("#61dafb"),
            credits_html: None,
        }
    }

    pub fn columns_for(&self, key: &str) -> Option<&[ColumnSpec]> {
        self.column_config_by_key
            .get(&key.to_lowercase())
            .map(Vec::as_slice)
    }

    pub fn title_for(&self, key: &str) -> String {
        self.title_override_by_key
            .get(&key.to_lowercase())
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn should_skip(&self, key: &str) -> bool {
        self.field_blacklist.contains(key) || self.skip_render_keys.contains(key)
    }

    pub fn split_for(&self, key: &str) -> Option<&SplitSection> {
        self.split_sections.iter().find(|s| s.key == key)
    }
}

fn columns(specs: &[(&str, &str, &str)]) -> Vec<ColumnSpec> {
    specs
        .iter()
        .map(|(field, label, width)| ColumnSpec::new(field, label, width))
        .collect()
}

fn string_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn string_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ReportConfig {
    /// Layout for a kill team roster export
    fn default() -> Self {
        let ploy_columns = columns(&[("ployname", "Name", "w20"), ("CP", "CP", "w5"), ("description", "Description", "w75")]);
        let ability_columns = columns(&[("title", "Title", "w10"), ("description", "Description", "w90")]);

        let mut column_config_by_key = HashMap::new();
        column_config_by_key.insert("strat".to_string(), ploy_columns.clone());
        column_config_by_key.insert("tac".to_string(), ploy_columns);
        column_config_by_key.insert(
            "equipments".to_string(),
            columns(&[("eqname", "Name", "w20"), ("eqdescription", "Description", "w80")]),
        );
        column_config_by_key.insert(
            "tacops".to_string(),
            columns(&[("title", "Title", "w20"), ("description", "Description", "w80")]),
        );
        column_config_by_key.insert("operatives_abilities".to_string(), ability_columns.clone());
        column_config_by_key.insert("abilities".to_string(), ability_columns);
        column_config_by_key.insert(
            "weapons".to_string(),
            columns(&[("wepname", "Weapon", "w10"), ("weptype", "Ranged/Melee", "w5"), ("profiles", "Profiles", "w85")]),
        );
        column_config_by_key.insert(
            "profiles".to_string(),
            columns(&[("A", "Atk", "w10"), ("BS", "Hit", "w10"), ("D", "Dmg", "w10"), ("SR", "Wr", "w70")]),
        );

        let mut emphasize_fields = HashMap::new();
        emphasize_fields.insert(
            "equipments".to_string(),
            Emphasis { main: "eqname".to_string(), extra: "eqtype".to_string() },
        );
        emphasize_fields.insert(
            "tacops".to_string(),
            Emphasis { main: "title".to_string(), extra: "archetype".to_string() },
        );

        ReportConfig {
            column_config_by_key,
            title_override_by_key: string_map(&[
                ("strat", "Strategic Ploys"),
                ("tac", "Tactical Ploys"),
                ("killteamname", "Kill Team"),
                ("description", "Description"),
                ("equipments", "Equipment"),
                ("killteamcomp", "Operatives"),
                ("tacops", "TacOps"),
                ("operatives_abilities", "Faction Rules"),
                ("operatives_uniqueactions", "Unique Actions for Operatives"),
                ("fireteams_operatives", "Operatives"),
                ("ploys", "Ploys"),
            ]),
            field_blacklist: string_set(&[
                "factionid", "killteamid", "ployid", "ploytype", "eqcategory", "eqid", "eqvar1", "eqvar2",
                "eqvar3", "eqvar4", "fireteamid", "opid", "eqpts", "eqseq", "edition", "tacopid", "tacopseq",
                "abilityid", "isdefault", "isselected", "wepid", "wepseq", "eqtype", "weapon", "name",
                "profileid",
            ]),
            render_order: [
                "description",
                "killteamcomp",
                "operatives_abilities",
                "fireteams_operatives",
                "ploys",
                "equipments",
                "tacops",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            skip_render_keys: string_set(&["weapons", "abilities", "uniqueactions"]),
            section_headers: string_map(&[
                ("ploys", "Ploys"),
                ("equipments", "Equipment List"),
                ("tacops", "Tactical Objectives"),
            ]),
            emphasize_fields,
            stat_columns: columns(&[("M", "Move", ""), ("APL", "APL", ""), ("SV", "Save", ""), ("W", "Wounds", "")]),
            operatives_key: Some("fireteams_operatives".to_string()),
            split_sections: vec![SplitSection {
                key: "equipments".to_string(),
                field: "killteamid".to_string(),
                team_label: "Equipment".to_string(),
                universal_value: "ALL".to_string(),
                universal_title: "Universal Equipment".to_string(),
            }],
            skip_falsy: true,
            title_field: Some("killteamname".to_string()),
            team_id_field: Some("killteamid".to_string()),
            title_suffix: String::from("Kill Team Overview"),
            accent_color: String::from("#D55F23"),
            credits_html: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_are_case_insensitive() {
        let config = ReportConfig::default();
        assert_eq!(config.title_for("TacOps"), "TacOps");
        assert_eq!(config.title_for("STRAT"), "Strategic Ploys");
        assert_eq!(config.columns_for("Profiles").unwrap().len(), 4);
        assert_eq!(config.title_for("unknown_key"), "unknown_key");
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"render_order": ["ploys"], "accent_color": "red"}"#).unwrap();
        assert_eq!(config.render_order, vec!["ploys"]);
        assert_eq!(config.accent_color, "red");
        assert!(config.field_blacklist.contains("opid"));
    }

    #[test]
    fn test_column_width_is_optional() {
        let spec: ColumnSpec = serde_json::from_str(r#"{"field": "M", "label": "Move"}"#).unwrap();
        assert_eq!(spec.width, None);
    }
}
