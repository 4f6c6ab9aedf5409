//! HTML sanitizing - rebuild a page as attribute-free, comment-free markup
//!
//! The cleaner walks a `scraper` DOM and produces an owned [`CleanNode`]
//! tree, dropping blocked tags, comments and empty elements. The document
//! driver selects candidate roots, cleans them and assembles a styled page,
//! with optional wrapper-collapse and duplicate-block passes.

pub mod cleaner;
pub mod document;
pub mod policy;
pub mod tree;

pub use cleaner::{clean_element, clean_fragment, normalize_whitespace, split_paragraphs};
pub use document::{dedupe_blocks, extract_and_render, Anchor, ExtractOptions, OutputDocument, Selection};
pub use policy::{CleanPolicy, TagMode, GENERIC_TAG, HEADING_TAGS, PARAGRAPH_TAG};
pub use tree::{escape_html, CleanElement, CleanNode};
