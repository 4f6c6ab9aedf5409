use crate::flatten::is_truthy;
use crate::report::config::{ColumnSpec, ReportConfig, SplitSection};
use crate::report::style::stylesheet;
use crate::sanitize::escape_html;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, warn};

static HTML_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?[a-z][\s\S]*?>").unwrap());

static NULL: Value = Value::Null;

const NO_DATA: &str = "<p><em>No data</em></p>";

/// Strings that already carry markup are passed through unescaped
pub fn contains_html(s: &str) -> bool {
    HTML_TAG_REGEX.is_match(s)
}

/// Cell text for a JSON value: strings verbatim, null empty, anything else as JSON
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_record_list(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => Some(items.as_slice()),
        _ => None,
    }
}

fn cell(tag: &str, class: Option<&str>, content: &str) -> String {
    match class {
        Some(class) => format!("<{tag} class='{}'>{content}</{tag}>", escape_html(class)),
        None => format!("<{tag}>{content}</{tag}>"),
    }
}

/// Resolved column: field, label, width class
type Column = (String, String, Option<String>);

/// Renders a flattened roster document as a standalone HTML page
pub struct ReportRenderer<'a> {
    config: &'a ReportConfig,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        ReportRenderer { config }
    }

    /// Render the complete page
    pub fn render(&self, data: &Value) -> String {
        let heading = match report_title(data, self.config) {
            Some(title) => format!("{title} - {}", self.config.title_suffix),
            None => self.config.title_suffix.clone(),
        };

        let mut parts = vec![
            "<!DOCTYPE html>".to_string(),
            "<html>".to_string(),
            "<head>".to_string(),
            "  <meta charset='UTF-8'>".to_string(),
            format!("  <title>{}</title>", escape_html(&heading)),
            format!("  <style>{}  </style>", stylesheet(&self.config.accent_color)),
            "</head>".to_string(),
            "<body>".to_string(),
            format!("  <h1>{}</h1>", escape_html(&heading)),
        ];

        match data.as_object() {
            Some(map) => parts.extend(self.render_sections(map, data)),
            None => warn!("report input is not an object; rendering an empty page"),
        }

        if let Some(credits) = &self.config.credits_html {
            parts.push(format!("  <footer class=\"credits\">\n    {credits}\n  </footer>"));
        }

        parts.push("</body></html>".to_string());
        parts.join("\n")
    }

    fn render_sections(&self, map: &Map<String, Value>, data: &Value) -> Vec<String> {
        let keys: Vec<&str> = if self.config.render_order.is_empty() {
            map.keys().map(String::as_str).collect()
        } else {
            self.config.render_order.iter().map(String::as_str).collect()
        };

        let mut parts = Vec::new();
        for key in keys {
            let value = match map.get(key) {
                Some(v) if !self.config.skip_falsy || is_truthy(v) => v,
                _ => continue,
            };
            debug!(section = key, "rendering section");

            if let Some(header) = self.config.section_headers.get(key) {
                parts.push(format!("<h1>{}</h1>", escape_html(header)));
            }

            let is_operatives = self.config.operatives_key.as_deref() == Some(key);
            match value {
                Value::Array(items) if is_operatives => parts.push(self.render_operatives(items)),
                Value::Array(items) => match self.config.split_for(key) {
                    Some(split) => parts.push(self.render_split(split, items, data)),
                    None => parts.push(self.render_value(key, value)),
                },
                Value::Object(members) => {
                    for (member, member_value) in members {
                        match member_value {
                            Value::Array(items) if items.iter().all(Value::is_object) => {
                                parts.push(self.render_table(member, items, true))
                            }
                            _ => parts.push(self.render_value(&format!("{key} - {member}"), member_value)),
                        }
                    }
                }
                _ => {
                    if !self.config.should_skip(key) {
                        parts.push(self.render_value(key, value));
                    }
                }
            }
        }
        parts
    }

    /// Configured columns for `key`, or the sorted union of non-blacklisted fields
    fn resolve_columns(&self, key: &str, items: &[Value]) -> Vec<Column> {
        if let Some(specs) = self.config.columns_for(key) {
            return specs
                .iter()
                .map(|ColumnSpec { field, label, width }| (field.clone(), label.clone(), width.clone()))
                .collect();
        }

        let fields: BTreeSet<&str> = items
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|obj| obj.keys().map(String::as_str))
            .filter(|k| !self.config.field_blacklist.contains(*k))
            .collect();
        fields
            .into_iter()
            .map(|f| (f.to_string(), f.to_string(), None))
            .collect()
    }

    fn header_row(columns: &[Column]) -> String {
        let cells: String = columns
            .iter()
            .map(|(_, label, width)| cell("th", width.as_deref(), &escape_html(label)))
            .collect();
        format!("<tr>{cells}</tr>")
    }

    /// Table of records; an empty list renders as a "No data" section
    pub fn render_table(&self, key: &str, items: &[Value], with_header: bool) -> String {
        let title = escape_html(&self.config.title_for(key));
        if items.is_empty() {
            return format!("<h2>{title}</h2>{NO_DATA}");
        }

        let columns = self.resolve_columns(key, items);
        let emphasis = self.config.emphasize_fields.get(&key.to_lowercase());

        let mut lines = Vec::new();
        if with_header {
            lines.push(format!("<h2>{title}</h2>"));
        }
        lines.push("<table>".to_string());
        lines.push(Self::header_row(&columns));

        for item in items {
            let row: String = columns
                .iter()
                .map(|(field, _, width)| {
                    let value = item.get(field).unwrap_or(&NULL);
                    let content = match (is_record_list(value), value) {
                        (Some(records), _) => self.render_subtable(records),
                        (None, Value::String(s)) if contains_html(s) => s.clone(),
                        _ => match emphasis {
                            Some(e) if &e.main == field => match (item.get(&e.main), item.get(&e.extra)) {
                                (Some(main), Some(extra)) => format!(
                                    "{} <span class='emphasis'>[{}]</span>",
                                    escape_html(&display_value(main)),
                                    escape_html(&display_value(extra))
                                ),
                                _ => escape_html(&display_value(value)),
                            },
                            _ => escape_html(&display_value(value)),
                        },
                    };
                    cell("td", width.as_deref(), &content)
                })
                .collect();
            lines.push(format!("<tr>{row}</tr>"));
        }

        lines.push("</table>".to_string());
        lines.join("\n")
    }

    /// Nested table for a list-of-records cell
    fn render_subtable(&self, items: &[Value]) -> String {
        let fields: BTreeSet<&str> = items
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|obj| obj.keys().map(String::as_str))
            .filter(|k| !self.config.field_blacklist.contains(*k))
            .collect();

        let mut html = String::from("<table><tr>");
        for field in &fields {
            html.push_str(&format!("<th>{}</th>", escape_html(field)));
        }
        html.push_str("</tr>");
        for item in items {
            html.push_str("<tr>");
            for field in &fields {
                let value = item.get(*field).unwrap_or(&NULL);
                html.push_str(&format!("<td>{}</td>", escape_html(&display_value(value))));
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");
        html
    }

    /// Titled section for any value
    pub fn render_value(&self, key: &str, value: &Value) -> String {
        let title = escape_html(&self.config.title_for(key));
        match value {
            Value::Array(items) if items.is_empty() => format!("<h2>{title}</h2>{NO_DATA}"),
            Value::Array(items) if items.iter().all(Value::is_object) => self.render_table(key, items, true),
            Value::Array(_) => {
                let pretty = serde_json::to_string_pretty(value).unwrap_or_default();
                format!("<h2>{title}</h2><pre>{}</pre>", escape_html(&pretty))
            }
            Value::Object(members) => members
                .iter()
                .filter(|(k, _)| !self.config.should_skip(k))
                .map(|(k, v)| self.render_value(&format!("{key} - {k}"), v))
                .collect::<Vec<_>>()
                .join("\n"),
            Value::String(s) if contains_html(s) => format!("<h2>{title}</h2><div>{s}</div>"),
            other => format!("<h2>{title}</h2><pre>{}</pre>", escape_html(&display_value(other))),
        }
    }

    fn render_operatives(&self, operatives: &[Value]) -> String {
        let mut html = Vec::new();
        for op in operatives {
            let name = op
                .get("opname")
                .and_then(Value::as_str)
                .unwrap_or("Unnamed Operative");
            html.push(format!("<h2>{}</h2>", escape_html(name)));
            html.push(self.render_stats_table(op));

            if let Some(weapons) = op.get("weapons").and_then(Value::as_array) {
                html.push(self.render_weapon_block(weapons));
            }

            if let Some(abilities) = op.get("abilities").and_then(Value::as_array).filter(|a| !a.is_empty()) {
                html.push("<h3>Abilities</h3>".to_string());
                html.push(self.render_table("abilities", abilities, false));
            }

            if let Some(keywords) = op.get("keywords").and_then(Value::as_str) {
                html.push(render_keywords(keywords));
            }

            if let Some(actions) = op.get("uniqueactions").and_then(Value::as_array).filter(|a| !a.is_empty()) {
                html.push("<h3>Unique Actions</h3>".to_string());
                html.push(self.render_table("uniqueactions", actions, false));
            }
        }
        html.join("\n")
    }

    /// One-row horizontal table of an operative's stats
    fn render_stats_table(&self, op: &Value) -> String {
        let stats = &self.config.stat_columns;
        if stats.is_empty() {
            return String::new();
        }

        let headers: String = stats
            .iter()
            .map(|c| format!("<th>{}</th>", escape_html(&c.label)))
            .collect();
        let values: String = stats
            .iter()
            .map(|c| {
                let value = op.get(&c.field).unwrap_or(&NULL);
                format!("<td>{}</td>", escape_html(&display_value(value)))
            })
            .collect();
        format!("<table><tr>{headers}</tr><tr>{values}</tr></table>")
    }

    fn render_weapon_block(&self, weapons: &[Value]) -> String {
        if weapons.is_empty() {
            return String::new();
        }

        let columns = self.resolve_columns("weapons", weapons);
        let mut html = String::from("<h3>Weapons</h3><table>");
        html.push_str(&Self::header_row(&columns));

        for weapon in weapons {
            html.push_str("<tr>");
            for (field, _, width) in &columns {
                let value = weapon.get(field).unwrap_or(&NULL);
                let content = if field == "profiles" {
                    self.render_profiles_table(value)
                } else if let Some(records) = is_record_list(value) {
                    self.render_subtable(records)
                } else {
                    let text = display_value(value);
                    if contains_html(&text) { text } else { escape_html(&text) }
                };
                html.push_str(&cell("td", width.as_deref(), &content));
            }
            html.push_str("</tr>");
        }

        html.push_str("</table>");
        html
    }

    fn render_profiles_table(&self, profiles: &Value) -> String {
        let profiles = match profiles.as_array() {
            Some(p) if !p.is_empty() => p,
            _ => return "<em>No profiles</em>".to_string(),
        };

        let columns = self.resolve_columns("profiles", profiles);
        let mut html = String::from("<table>");
        html.push_str(&Self::header_row(&columns));
        for profile in profiles {
            html.push_str("<tr>");
            for (field, _, width) in &columns {
                let text = display_value(profile.get(field).unwrap_or(&NULL));
                let content = if contains_html(&text) { text } else { escape_html(&text) };
                html.push_str(&cell("td", width.as_deref(), &content));
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");
        html
    }

    /// Team-specific records first, then the ones shared by every team
    fn render_split(&self, split: &SplitSection, items: &[Value], data: &Value) -> String {
        let team = team_id(data, self.config);
        let universal = split.universal_value.to_uppercase();
        let field_of = |item: &Value| {
            item.get(&split.field)
                .and_then(Value::as_str)
                .map(str::to_uppercase)
                .unwrap_or_default()
        };

        let team_items: Vec<Value> = items
            .iter()
            .filter(|item| team.as_deref().map_or(false, |t| field_of(*item) == t))
            .cloned()
            .collect();
        let universal_items: Vec<Value> = items
            .iter()
            .filter(|item| field_of(*item) == universal)
            .cloned()
            .collect();

        let mut html = Vec::new();
        if !team_items.is_empty() {
            let title = report_title(data, self.config).unwrap_or_else(|| "Team".to_string());
            html.push(format!("<h2>{} {}</h2>", escape_html(&title), escape_html(&split.team_label)));
            html.push(self.render_table(&split.key, &team_items, false));
        }
        if !universal_items.is_empty() {
            html.push(format!("<h2>{}</h2>", escape_html(&split.universal_title)));
            html.push(self.render_table(&split.key, &universal_items, false));
        }
        html.join("\n")
    }
}

/// Comma-separated keywords as chips
pub fn render_keywords(keywords: &str) -> String {
    let tags: Vec<String> = keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| format!("<span class='keyword-tag'>{}</span>", escape_html(k)))
        .collect();

    if tags.is_empty() {
        return String::new();
    }
    format!("<div class='keywords-block'><strong>Keywords:</strong> {}</div>", tags.join(" "))
}

/// Report title from the configured field; `None` when no title field is set
pub fn report_title(data: &Value, config: &ReportConfig) -> Option<String> {
    let field = config.title_field.as_deref()?;
    Some(
        data.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("Unnamed Roster")
            .to_string(),
    )
}

/// Upper-cased team id from the configured field
pub fn team_id(data: &Value, config: &ReportConfig) -> Option<String> {
    let field = config.team_id_field.as_deref()?;
    data.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
}

/// Render `data` with `config`
pub fn render_report(data: &Value, config: &ReportConfig) -> String {
    ReportRenderer::new(config).render(data)
}
