use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Generic container every element becomes in [`TagMode::Collapse`]
pub const GENERIC_TAG: &str = "div";

/// Element wrapped around each text block when paragraph splitting is on
pub const PARAGRAPH_TAG: &str = "p";

pub const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// How output element names are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    /// Keep the source tag name
    Preserve,
    /// Rename every element to [`GENERIC_TAG`]
    Collapse,
}

/// Rules applied by the sanitizing tree-rewriter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanPolicy {
    /// Elements dropped together with their whole subtree
    pub blocked_tags: BTreeSet<String>,

    pub tag_mode: TagMode,

    /// Split text on blank lines and wrap each block in a paragraph
    pub paragraphs: bool,

    /// Text directly inside h1..h6 is never paragraph-wrapped
    pub headings_exempt: bool,

    /// Drop subtrees with no visible (non-whitespace, non-comment) text
    pub require_visible_text: bool,

    /// Drop subtrees carrying framework directives
    pub drop_directives: bool,

    /// Attribute/word prefixes that mark a framework directive, e.g. "ng-"
    pub directive_prefixes: Vec<String>,
}

impl CleanPolicy {
    pub fn is_blocked(&self, tag: &str) -> bool {
        self.blocked_tags.contains(&tag.to_ascii_lowercase())
    }

    pub fn block(mut self, tag: impl Into<String>) -> Self {
        self.blocked_tags.insert(tag.into().to_ascii_lowercase());
        self
    }

    pub fn output_name<'a>(&self, source: &'a str) -> &'a str {
        match self.tag_mode {
            TagMode::Preserve => source,
            TagMode::Collapse => GENERIC_TAG,
        }
    }

    /// True for tokens like `ng-if`: a reserved prefix followed by a word character
    pub fn is_directive(&self, token: &str) -> bool {
        self.directive_prefixes.iter().any(|prefix| {
            !prefix.is_empty()
                && token
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| rest.chars().next())
                    .map_or(false, |c| c.is_alphanumeric() || c == '_')
        })
    }
}

pub fn is_heading(tag: &str) -> bool {
    HEADING_TAGS.contains(&tag)
}

impl Default for CleanPolicy {
    fn default() -> Self {
        CleanPolicy {
            blocked_tags: ["button", "input", "textarea", "script", "style", "noscript"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            tag_mode: TagMode::Preserve,
            paragraphs: false,
            headings_exempt: true,
            require_visible_text: false,
            drop_directives: false,
            directive_prefixes: vec![String::from("ng-")],
        }
    }
}
