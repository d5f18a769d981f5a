//! Load, decompose, audit and write.

use crate::config::RunConfig;
use anyhow::Context;
use kaya_core::{decompose, DecompositionTable, MultiplicativeTable};
use kaya_io::{
    read_panel_file, write_contributions, write_multiplicative, write_national_series,
    write_sector_totals, IoResult,
};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONTRIBUTIONS_FILE: &str = "contributions.csv";
pub const SECTOR_TOTALS_FILE: &str = "sector_totals.csv";
pub const NATIONAL_SERIES_FILE: &str = "national_series.csv";
pub const MULTIPLICATIVE_FILE: &str = "multiplicative.csv";

/// Results of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub table: DecompositionTable,
    pub multiplicative: MultiplicativeTable,
    /// Written tables, in the order above
    pub outputs: Vec<PathBuf>,
}

/// Run the full decomposition described by `config`.
pub fn run(config: &RunConfig) -> anyhow::Result<RunReport> {
    let panel = read_panel_file(&config.input, &config.schema)
        .with_context(|| format!("Failed to load panel from {}", config.input.display()))?;

    config.identity.validate()?;
    let table = decompose(&panel, &config.identity, &config.decomposition)
        .context("Decomposition failed")?;
    table
        .check_additivity(config.additivity_tolerance)
        .context("Contributions do not reconstruct the emission changes")?;
    let multiplicative = table
        .multiplicative()
        .context("Multiplicative decomposition failed")?;

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    let outputs = vec![
        write_table(&config.output_dir, CONTRIBUTIONS_FILE, |w| {
            write_contributions(w, &table)
        })?,
        write_table(&config.output_dir, SECTOR_TOTALS_FILE, |w| {
            write_sector_totals(w, &table.sector_totals())
        })?,
        write_table(&config.output_dir, NATIONAL_SERIES_FILE, |w| {
            write_national_series(w, &table.national_series())
        })?,
        write_table(&config.output_dir, MULTIPLICATIVE_FILE, |w| {
            write_multiplicative(w, &multiplicative)
        })?,
    ];

    log_summary(&table, &multiplicative);

    Ok(RunReport {
        table,
        multiplicative,
        outputs,
    })
}

fn write_table<F>(dir: &Path, name: &str, write: F) -> anyhow::Result<PathBuf>
where
    F: FnOnce(BufWriter<File>) -> IoResult<()>,
{
    let path = dir.join(name);
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    write(BufWriter::new(file)).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote table");
    Ok(path)
}

fn log_summary(table: &DecompositionTable, multiplicative: &MultiplicativeTable) {
    let cumulative = table.cumulative();
    let factors = multiplicative.cumulative_factors();
    let (first, last) = (table.years()[0], table.years()[table.years().len() - 1]);

    info!(
        first,
        last,
        delta = cumulative.delta,
        unit = table.unit(),
        ratio = multiplicative.cumulative_ratio(),
        "Total emission change"
    );
    for (k, (driver, contribution)) in cumulative.iter().enumerate() {
        info!(
            driver,
            contribution,
            factor = factors[k],
            "Cumulative contribution"
        );
    }
    if cumulative.unattributed != 0.0 {
        warn!(
            unattributed = cumulative.unattributed,
            transitions = table.zero_emission_transitions().len(),
            "Part of the emission change was left unattributed"
        );
    }
}
