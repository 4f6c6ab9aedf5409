//! ktroster-extract: Strip an HTML page down to its bare content blocks
//!
//! Usage:
//!   # Every element in <body>, attributes and buttons removed
//!   ktroster-extract page.html -o clean.html
//!
//!   # Only `.card` elements after the first <main>, deduplicated
//!   ktroster-extract page.html --class card --trim-before main --collapse-wrappers --dedupe

use anyhow::{Context, Result};
use clap::Parser;
use ktroster::sanitize::{extract_and_render, Anchor, ExtractOptions, Selection, TagMode};
use ktroster::{write_html_file, PipelineConfig, PipelineError};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ktroster-extract")]
#[command(about = "Sanitize an HTML page into a minimal styled document", long_about = None)]
struct Args {
    /// HTML page to clean
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: extracted_divs.html)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Only elements with this class become blocks; repeatable. Omit for the whole body
    #[arg(long = "class", value_name = "NAME")]
    classes: Vec<String>,

    /// Rename every kept element to div
    #[arg(long)]
    collapse_tags: bool,

    /// Wrap text runs separated by blank lines in <p>
    #[arg(long)]
    paragraphs: bool,

    /// Wrap text inside headings in <p> as well
    #[arg(long)]
    no_heading_exempt: bool,

    /// Drop elements without visible text
    #[arg(long)]
    require_visible_text: bool,

    /// Drop elements using framework directive attributes (ng-*)
    #[arg(long)]
    drop_directives: bool,

    /// Replace div wrappers that only hold another div
    #[arg(long)]
    collapse_wrappers: bool,

    /// Keep only the first of identical top-level blocks
    #[arg(long)]
    dedupe: bool,

    /// Ignore everything before the first TAG or TAG.CLASS element
    #[arg(long, value_name = "TAG.CLASS")]
    trim_before: Option<Anchor>,

    /// Additional tag to remove with its subtree; repeatable
    #[arg(long = "block", value_name = "TAG")]
    blocked: Vec<String>,

    /// JSON config file; its `sanitize` section is the starting policy
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let args = Args::parse();
    let config = PipelineConfig::load(args.config.as_deref())?;

    let mut policy = config.sanitize;
    if args.collapse_tags {
        policy.tag_mode = TagMode::Collapse;
    }
    policy.paragraphs |= args.paragraphs;
    if args.no_heading_exempt {
        policy.headings_exempt = false;
    }
    policy.require_visible_text |= args.require_visible_text;
    policy.drop_directives |= args.drop_directives;
    for tag in args.blocked {
        policy = policy.block(tag);
    }

    let options = ExtractOptions {
        selection: if args.classes.is_empty() {
            Selection::WholeBody
        } else {
            Selection::Classes(args.classes)
        },
        policy,
        trim_before: args.trim_before,
        collapse_wrappers: args.collapse_wrappers,
        dedupe_blocks: args.dedupe,
        ..ExtractOptions::default()
    };

    let html = std::fs::read_to_string(&args.input)
        .map_err(|e| PipelineError::from_io(&args.input, e))
        .context("Failed to read input page")?;
    let document = extract_and_render(&html, &options);

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from("extracted_divs.html"));
    write_html_file(&output, &document.to_html())?;
    info!("Wrote {} block(s) to {}", document.body.len(), output.display());

    Ok(())
}
