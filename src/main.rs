//! `kaya-lmdi`: decompose sectoral emission changes into Kaya drivers.
//!
//! # Usage
//!
//! ```bash
//! kaya-lmdi --config run.toml --input data/sektor_kaya.csv --output output/
//! ```

use anyhow::Context;
use clap::Parser;
use kaya_lmdi::{run, RunConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// LMDI decomposition of sectoral greenhouse-gas emissions
#[derive(Parser, Debug)]
#[command(name = "kaya-lmdi", version)]
#[command(about = "Attribute emission changes to activity, structure, efficiency, fossil share and carbon efficiency")]
struct Args {
    /// TOML run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Long-format panel CSV, overrides the configuration
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for result tables
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// First year of the analysis window
    #[arg(long)]
    base_year: Option<i32>,

    /// Last year of the analysis window
    #[arg(long)]
    end_year: Option<i32>,

    /// Log per-interval detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(year) = args.base_year {
        config.decomposition.base_year = Some(year);
    }
    if let Some(year) = args.end_year {
        config.decomposition.end_year = Some(year);
    }

    let report = run(&config).context("Run failed")?;
    for path in &report.outputs {
        println!("{}", path.display());
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
