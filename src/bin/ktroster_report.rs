//! ktroster-report: Render a roster export as a styled HTML report
//!
//! Usage:
//!   # Writes <TEAMID>.html in the current directory
//!   ktroster-report roster.html
//!
//!   # Any flattened JSON, every key, no kill team layout
//!   ktroster-report data.json --generic -o viewer.html

use anyhow::{Context, Result};
use clap::Parser;
use ktroster::report::team_id;
use ktroster::{clean_and_flatten, load_document, render_report, write_html_file, write_json_file};
use ktroster::{PipelineConfig, ReportConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ktroster-report")]
#[command(about = "Render a kill team roster as an HTML report", long_about = None)]
struct Args {
    /// Export page (.html) or roster JSON
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: <TEAMID>.html, or report.html without a team id)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// JSON config file; omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the flattened JSON here
    #[arg(long, value_name = "FLAT.json")]
    json_out: Option<PathBuf>,

    /// Render every key with the generic viewer layout
    #[arg(long)]
    generic: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let args = Args::parse();
    let mut config = PipelineConfig::load(args.config.as_deref())?;
    if args.generic {
        config.report = ReportConfig::generic();
    }

    let document = load_document(&args.input, &config.source)
        .with_context(|| format!("Failed to load roster from {}", args.input.display()))?;
    let flattened = clean_and_flatten(document, &config);

    if let Some(json_out) = &args.json_out {
        write_json_file(json_out, &flattened)?;
        info!("Wrote flattened JSON to {}", json_out.display());
    }

    let html = render_report(&flattened, &config.report);

    let output = args.output.unwrap_or_else(|| match team_id(&flattened, &config.report) {
        Some(id) => PathBuf::from(format!("{id}.html")),
        None => PathBuf::from("report.html"),
    });
    write_html_file(&output, &html)?;
    info!("Wrote report to {}", output.display());

    Ok(())
}
