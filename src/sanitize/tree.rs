//! Owned output tree produced by the cleaner
//!
//! The source DOM belongs to `scraper`; cleaning builds this much smaller
//! tree bottom-up instead of editing the source in place. Elements carry no
//! attributes, and an element is never constructed without children.

use crate::sanitize::policy::{GENERIC_TAG, PARAGRAPH_TAG};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanNode {
    Element(CleanElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanElement {
    pub name: String,
    pub children: Vec<CleanNode>,
}

impl CleanElement {
    /// Build an element, or `None` when there is nothing to put in it
    pub fn non_empty(name: impl Into<String>, children: Vec<CleanNode>) -> Option<Self> {
        if children.is_empty() {
            None
        } else {
            Some(CleanElement {
                name: name.into(),
                children,
            })
        }
    }

    /// Children other than blank text
    fn meaningful_children(&self) -> impl Iterator<Item = &CleanNode> {
        self.children.iter().filter(|c| !c.is_blank_text())
    }
}

impl CleanNode {
    pub fn text(s: impl Into<String>) -> Self {
        CleanNode::Text(s.into())
    }

    pub fn element(name: impl Into<String>, children: Vec<CleanNode>) -> Self {
        CleanNode::Element(CleanElement {
            name: name.into(),
            children,
        })
    }

    pub fn is_blank_text(&self) -> bool {
        matches!(self, CleanNode::Text(t) if t.trim().is_empty())
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, CleanNode::Element(el) if el.name == GENERIC_TAG)
    }

    /// Compact serialization, also the input to block fingerprints
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_compact(&mut out);
        out
    }

    fn write_compact(&self, out: &mut String) {
        match self {
            CleanNode::Text(t) => out.push_str(&escape_html(t)),
            CleanNode::Element(el) => {
                out.push('<');
                out.push_str(&el.name);
                out.push('>');
                for child in &el.children {
                    child.write_compact(out);
                }
                out.push_str("</");
                out.push_str(&el.name);
                out.push('>');
            }
        }
    }

    /// Indented serialization, two spaces per level
    pub fn write_pretty(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match self {
            CleanNode::Text(t) => {
                out.push_str(&indent);
                out.push_str(&escape_html(t));
                out.push('\n');
            }
            CleanNode::Element(el) => {
                // Single text child stays on one line
                if let [CleanNode::Text(t)] = el.children.as_slice() {
                    out.push_str(&format!("{indent}<{0}>{1}</{0}>\n", el.name, escape_html(t)));
                    return;
                }
                out.push_str(&format!("{indent}<{}>\n", el.name));
                for child in &el.children {
                    child.write_pretty(depth + 1, out);
                }
                out.push_str(&format!("{indent}</{}>\n", el.name));
            }
        }
    }

    /// Replace generic wrappers whose only meaningful child is another
    /// generic element with that child, everywhere in the subtree.
    ///
    /// Children are collapsed first, so a single bottom-up pass reaches the
    /// fixed point: a surviving child can never itself be such a wrapper.
    pub fn collapse_wrappers(self) -> CleanNode {
        match self {
            CleanNode::Text(_) => self,
            CleanNode::Element(el) => {
                let children: Vec<CleanNode> =
                    el.children.into_iter().map(CleanNode::collapse_wrappers).collect();
                let rebuilt = CleanElement {
                    name: el.name,
                    children,
                };

                if rebuilt.name == GENERIC_TAG {
                    let mut meaningful = rebuilt.meaningful_children();
                    if let (Some(only), None) = (meaningful.next(), meaningful.next()) {
                        if only.is_generic() {
                            return only.clone();
                        }
                    }
                }

                CleanNode::Element(rebuilt)
            }
        }
    }

    /// Lift paragraph blocks out of a `p` into sibling `p` elements.
    ///
    /// Inline content between blocks is gathered into its own `p`. Anything
    /// other than a `p` holding `p` children comes back unchanged.
    pub fn split_nested_paragraphs(self) -> Vec<CleanNode> {
        let el = match self {
            CleanNode::Element(el)
                if el.name == PARAGRAPH_TAG && el.children.iter().any(CleanNode::is_paragraph) =>
            {
                el
            }
            other => return vec![other],
        };

        let mut blocks = Vec::new();
        let mut inline = Vec::new();
        for child in el.children {
            if child.is_paragraph() {
                let pending = std::mem::take(&mut inline);
                blocks.extend(CleanElement::non_empty(PARAGRAPH_TAG, pending).map(CleanNode::Element));
                blocks.push(child);
            } else {
                inline.push(child);
            }
        }
        blocks.extend(CleanElement::non_empty(PARAGRAPH_TAG, inline).map(CleanNode::Element));
        blocks
    }

    fn is_paragraph(&self) -> bool {
        matches!(self, CleanNode::Element(el) if el.name == PARAGRAPH_TAG)
    }
}

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div(children: Vec<CleanNode>) -> CleanNode {
        CleanNode::element("div", children)
    }

    #[test]
    fn test_empty_element_is_not_built() {
        assert!(CleanElement::non_empty("div", vec![]).is_none());
        assert!(CleanElement::non_empty("div", vec![CleanNode::text("x")]).is_some());
    }

    #[test]
    fn test_compact_serialization_escapes_text() {
        let node = CleanNode::element("p", vec![CleanNode::text("a < b & c")]);
        assert_eq!(node.to_html(), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_pretty_serialization() {
        let node = div(vec![
            CleanNode::element("h2", vec![CleanNode::text("Title")]),
            CleanNode::text("body"),
        ]);

        let mut out = String::new();
        node.write_pretty(1, &mut out);
        assert_eq!(out, "  <div>\n    <h2>Title</h2>\n    body\n  </div>\n");
    }

    #[test]
    fn test_nested_wrappers_collapse_to_innermost() {
        let node = div(vec![div(vec![div(vec![CleanNode::text("deep")])])]);
        assert_eq!(node.collapse_wrappers(), div(vec![CleanNode::text("deep")]));
    }

    #[test]
    fn test_blank_text_is_ignored_when_collapsing() {
        let node = div(vec![CleanNode::text("  "), div(vec![CleanNode::text("inner")])]);
        assert_eq!(node.collapse_wrappers(), div(vec![CleanNode::text("inner")]));
    }

    #[test]
    fn test_wrapper_with_siblings_is_kept() {
        let node = div(vec![div(vec![CleanNode::text("a")]), CleanNode::text("b")]);
        assert_eq!(node.clone().collapse_wrappers(), node);
    }

    #[test]
    fn test_nested_paragraphs_become_siblings() {
        let p = |children| CleanNode::element("p", children);
        let node = p(vec![
            p(vec![CleanNode::text("one")]),
            CleanNode::element("b", vec![CleanNode::text("x")]),
            p(vec![CleanNode::text("two")]),
        ]);

        assert_eq!(
            node.split_nested_paragraphs(),
            vec![
                p(vec![CleanNode::text("one")]),
                p(vec![CleanNode::element("b", vec![CleanNode::text("x")])]),
                p(vec![CleanNode::text("two")]),
            ]
        );

        let plain = p(vec![CleanNode::text("kept")]);
        assert_eq!(plain.clone().split_nested_paragraphs(), vec![plain]);
    }

    #[test]
    fn test_non_generic_wrapper_is_kept() {
        let node = CleanNode::element("section", vec![div(vec![CleanNode::text("a")])]);
        assert_eq!(node.clone().collapse_wrappers(), node);
    }
}
