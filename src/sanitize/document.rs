//! Whole-document extraction: pick candidate roots, clean them, and
//! assemble the survivors into a fresh styled page.

use crate::sanitize::cleaner::clean_element;
use crate::sanitize::policy::CleanPolicy;
use crate::sanitize::tree::{escape_html, CleanNode};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

pub const EXTRACT_STYLESHEET: &str = "body {background-color: #1e1e1e; color: #f0f0f0; font-family: sans-serif; padding: 20px;}\n    div {margin-bottom: 1em;}";

/// Which source elements become candidate roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Elements whose class list contains any of these names
    Classes(Vec<String>),
    /// Every element inside `<body>`
    WholeBody,
}

/// First element with this tag (and class, when given) marks where selection starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub tag: String,
    pub class: Option<String>,
}

impl Anchor {
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        let value = element.value();
        value.name() == self.tag
            && self
                .class
                .as_deref()
                .map_or(true, |class| value.classes().any(|c| c == class))
    }
}

impl FromStr for Anchor {
    type Err = String;

    /// Parses `tag` or `tag.class`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tag, class) = match s.split_once('.') {
            Some((tag, class)) => (tag, Some(class)),
            None => (s, None),
        };
        if tag.is_empty() || class.map_or(false, str::is_empty) {
            return Err(format!("invalid anchor '{s}', expected TAG or TAG.CLASS"));
        }
        Ok(Anchor {
            tag: tag.to_ascii_lowercase(),
            class: class.map(str::to_string),
        })
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}.{}", self.tag, class),
            None => write!(f, "{}", self.tag),
        }
    }
}

/// Options for [`extract_and_render`]
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub selection: Selection,
    pub policy: CleanPolicy,

    /// Discard candidates that precede this anchor in the source
    pub trim_before: Option<Anchor>,

    /// Replace `div` wrappers around a single `div`
    pub collapse_wrappers: bool,

    /// Keep only the first of identical top-level blocks
    pub dedupe_blocks: bool,

    pub title: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            selection: Selection::WholeBody,
            policy: CleanPolicy::default(),
            trim_before: None,
            collapse_wrappers: false,
            dedupe_blocks: false,
            title: String::from("Extracted Divs"),
        }
    }
}

/// Minimal styled page holding the cleaned blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    pub title: String,
    pub stylesheet: String,
    pub body: Vec<CleanNode>,
}

impl OutputDocument {
    pub fn new(title: impl Into<String>) -> Self {
        OutputDocument {
            title: title.into(),
            stylesheet: EXTRACT_STYLESHEET.to_string(),
            body: Vec::new(),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("  <meta charset=\"UTF-8\">\n");
        out.push_str(&format!("  <title>{}</title>\n", escape_html(&self.title)));
        out.push_str(&format!("  <style>\n    {}\n  </style>\n", self.stylesheet));
        out.push_str("</head>\n<body>\n");
        for block in &self.body {
            block.write_pretty(1, &mut out);
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}

/// Parse `html`, clean every candidate root and assemble the output page.
///
/// Passes run in a fixed order: anchor trimming on the source, candidate
/// selection, cleaning, wrapper collapse, then duplicate-block removal.
pub fn extract_and_render(html: &str, options: &ExtractOptions) -> OutputDocument {
    let document = Html::parse_document(html);
    let candidates = select_candidates(&document, options);
    let candidate_count = candidates.len();

    let mut body: Vec<CleanNode> = candidates
        .into_iter()
        .filter_map(|el| clean_element(el, &options.policy))
        .flat_map(CleanNode::split_nested_paragraphs)
        .collect();
    debug!(candidates = candidate_count, cleaned = body.len(), "cleaned candidates");

    if options.collapse_wrappers {
        body = body.into_iter().map(CleanNode::collapse_wrappers).collect();
    }

    if options.dedupe_blocks {
        let before = body.len();
        body = dedupe_blocks(body);
        debug!(removed = before - body.len(), "removed duplicate blocks");
    }

    info!(blocks = body.len(), "extraction complete");

    let mut output = OutputDocument::new(options.title.clone());
    output.body = body;
    output
}

/// Candidate roots in document order, after anchor trimming
fn select_candidates<'a>(document: &'a Html, options: &ExtractOptions) -> Vec<ElementRef<'a>> {
    let all: Vec<ElementRef<'a>> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect();

    let start = match &options.trim_before {
        Some(anchor) => match all.iter().position(|el| anchor.matches(el)) {
            Some(index) => index,
            None => {
                warn!(anchor = %anchor, "anchor not found, keeping whole document");
                0
            }
        },
        None => 0,
    };

    let in_scope = &all[start..];
    match &options.selection {
        Selection::Classes(names) => in_scope
            .iter()
            .filter(|el| el.value().classes().any(|c| names.iter().any(|n| n == c)))
            .copied()
            .collect(),
        Selection::WholeBody => match document.select(&BODY_SELECTOR).next() {
            Some(body) => in_scope
                .iter()
                .filter(|el| el.ancestors().any(|a| a.id() == body.id()))
                .copied()
                .collect(),
            None => in_scope.to_vec(),
        },
    }
}

/// Drop top-level blocks whose serialized form was already seen
pub fn dedupe_blocks(blocks: Vec<CleanNode>) -> Vec<CleanNode> {
    let mut seen = HashSet::new();
    blocks
        .into_iter()
        .filter(|block| seen.insert(fingerprint(block)))
        .collect()
}

/// md5 digest of a block's compact serialization
pub fn fingerprint(block: &CleanNode) -> String {
    format!("{:x}", md5::compute(block.to_html()))
}
