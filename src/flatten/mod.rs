//! JSON flattening - lift nested child sequences into top-level keys
//!
//! Given `{"fireteams": [{"operatives": [...]}, ...]}` and the target
//! `fireteams -> operatives`, every operative list is concatenated into a
//! new top-level `fireteams_operatives` key, optionally deduplicated by an
//! identity field.

pub mod dedup;
pub mod extractor;
pub mod types;

pub use dedup::{dedupe_by_field, is_truthy};
pub use extractor::JsonFlattener;
pub use types::{FlattenConfig, FlattenTarget};
