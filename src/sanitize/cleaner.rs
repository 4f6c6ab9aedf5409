use crate::sanitize::policy::{is_heading, CleanPolicy, PARAGRAPH_TAG};
use crate::sanitize::tree::{CleanElement, CleanNode};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

static BLANK_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[^\S\n]*\n").unwrap());

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w-]+").unwrap());

/// Collapse whitespace runs to one space and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}

/// Split on blank lines, normalizing each block and dropping empty ones
pub fn split_paragraphs(text: &str) -> Vec<String> {
    BLANK_LINE_REGEX
        .split(text)
        .map(normalize_whitespace)
        .filter(|block| !block.is_empty())
        .collect()
}

/// Clean one element and its subtree.
///
/// Returns `None` when the element is blocked, filtered out by policy, or
/// left with no children after cleaning. With `paragraphs` set, a `p` comes
/// back holding its own paragraph blocks; [`CleanNode::split_nested_paragraphs`]
/// turns those into siblings, as child cleaning and the document driver do.
pub fn clean_element(element: ElementRef<'_>, policy: &CleanPolicy) -> Option<CleanNode> {
    let name = element.value().name();

    // Blocked subtrees go before any other inspection
    if policy.is_blocked(name) {
        return None;
    }

    if policy.require_visible_text && !has_visible_text(element) {
        return None;
    }

    if policy.drop_directives && has_directive(element, policy) {
        return None;
    }

    let wrap_text = policy.paragraphs && !(policy.headings_exempt && is_heading(name));
    let children = clean_children(element, policy, wrap_text);

    CleanElement::non_empty(policy.output_name(name), children).map(CleanNode::Element)
}

/// Clean the top-level nodes of an HTML fragment
pub fn clean_fragment(html: &str, policy: &CleanPolicy) -> Vec<CleanNode> {
    let fragment = Html::parse_fragment(html);
    clean_children(fragment.root_element(), policy, policy.paragraphs)
}

fn clean_children(element: ElementRef<'_>, policy: &CleanPolicy, wrap_text: bool) -> Vec<CleanNode> {
    let mut children = Vec::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(text, wrap_text, &mut children),
            Node::Element(_) => {
                if let Some(cleaned) = ElementRef::wrap(child).and_then(|el| clean_element(el, policy)) {
                    children.extend(cleaned.split_nested_paragraphs());
                }
            }
            // Comments, doctypes and processing instructions never survive
            _ => {}
        }
    }

    children
}

fn push_text(raw: &str, wrap_text: bool, children: &mut Vec<CleanNode>) {
    if wrap_text {
        for block in split_paragraphs(raw) {
            children.push(CleanNode::element(PARAGRAPH_TAG, vec![CleanNode::Text(block)]));
        }
    } else {
        let text = normalize_whitespace(raw);
        if text.is_empty() {
            return;
        }
        // Text split by a dropped comment rejoins its neighbour
        match children.last_mut() {
            Some(CleanNode::Text(previous)) => {
                previous.push(' ');
                previous.push_str(&text);
            }
            _ => children.push(CleanNode::Text(text)),
        }
    }
}

/// Any non-whitespace text node anywhere below `element`
pub fn has_visible_text(element: ElementRef<'_>) -> bool {
    element.descendants().any(|node| match node.value() {
        Node::Text(text) => !text.trim().is_empty(),
        _ => false,
    })
}

/// Any directive-looking attribute or text token anywhere below `element`
pub fn has_directive(element: ElementRef<'_>, policy: &CleanPolicy) -> bool {
    element.descendants().any(|node| match node.value() {
        Node::Element(el) => el.attrs().any(|(name, value)| {
            policy.is_directive(name) || value.split_whitespace().any(|v| policy.is_directive(v))
        }),
        Node::Text(text) => WORD_REGEX
            .find_iter(text)
            .any(|word| policy.is_directive(word.as_str())),
        _ => false,
    })
}
