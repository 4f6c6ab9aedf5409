//! ktroster-flatten: Pull the roster JSON out of an export and flatten it
//!
//! Usage:
//!   # Export page to flattened JSON next to it
//!   ktroster-flatten roster.html
//!
//!   # Already-extracted JSON, explicit output, keep the intermediate files
//!   ktroster-flatten roster.json -o flat.json --intermediate-dir ./debug

use anyhow::{Context, Result};
use clap::Parser;
use ktroster::{clean_and_flatten, load_document, remove_keys, write_json_file, PipelineConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ktroster-flatten")]
#[command(about = "Extract and flatten kill team roster JSON", long_about = None)]
struct Args {
    /// Export page (.html) or extracted roster (.json)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: flattened_output.json)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// JSON config file; omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write pretty_output.json and cleaned_output.json here
    #[arg(long)]
    intermediate_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let args = Args::parse();
    let config = PipelineConfig::load(args.config.as_deref())?;

    let document = load_document(&args.input, &config.source)
        .with_context(|| format!("Failed to load roster from {}", args.input.display()))?;

    if let Some(dir) = &args.intermediate_dir {
        write_json_file(dir.join("pretty_output.json"), &document)?;
        let cleaned = remove_keys(document.clone(), &config.source.keys_to_ignore);
        write_json_file(dir.join("cleaned_output.json"), &cleaned)?;
        info!("Wrote intermediate files to {}", dir.display());
    }

    let flattened = clean_and_flatten(document, &config);

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from("flattened_output.json"));
    write_json_file(&output, &flattened)?;
    info!("Wrote flattened JSON to {}", output.display());

    Ok(())
}
