//! HTML report rendering for flattened roster documents
//!
//! Sections follow the configured render order. Lists of records become
//! tables with configured columns, operatives become cards, and split
//! sections separate team-specific records from universal ones.

pub mod config;
pub mod render;
pub mod style;

pub use config::{ColumnSpec, Emphasis, ReportConfig, SplitSection};
pub use render::{contains_html, display_value, render_report, report_title, team_id, ReportRenderer};
pub use style::stylesheet;
