//! CSV writers for decomposition results.
//!
//! Long-format contributions are the primary output. The wide tables are
//! convenience views for plotting: one row per sector or per interval, one
//! column per driver in identity order.
//!
//! Numbers are written with the shortest representation that round-trips,
//! so integral values appear without a fractional part (`6`, not `6.0`).

use crate::errors::IoResult;
use csv::Writer;
use kaya_core::{DecompositionTable, FloatValue, MultiplicativeTable, NationalSeries, SectorTotals};
use std::io::Write;

/// Write one row per sector, interval end year and driver.
///
/// Columns: `sector`, `year`, `driver`, `contribution`, `unit`.
pub fn write_contributions<W: Write>(writer: W, table: &DecompositionTable) -> IoResult<()> {
    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record(["sector", "year", "driver", "contribution", "unit"])?;

    for record in table.records() {
        csv_writer.write_record([
            record.sector,
            record.year.to_string(),
            record.driver,
            number(record.contribution),
            table.unit().to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write cumulative contributions as one row per sector.
///
/// Columns: `sector`, one per driver, `unattributed`, `total`, `delta_emissions`.
pub fn write_sector_totals<W: Write>(writer: W, totals: &SectorTotals) -> IoResult<()> {
    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record(header(
        "sector",
        &totals.drivers,
        &["unattributed", "total", "delta_emissions"],
    ))?;

    for (s, sector) in totals.sectors.iter().enumerate() {
        let row = totals.values.row(s);
        let total = row.sum() + totals.unattributed[s];
        let mut record = vec![sector.clone()];
        record.extend(row.iter().map(|v| number(*v)));
        record.push(number(totals.unattributed[s]));
        record.push(number(total));
        record.push(number(totals.delta[s]));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write national contributions as one row per interval.
///
/// Columns: `year`, one per driver, `unattributed`, `delta_emissions`,
/// `emissions` (level at the interval end year).
pub fn write_national_series<W: Write>(writer: W, series: &NationalSeries) -> IoResult<()> {
    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record(header(
        "year",
        &series.drivers,
        &["unattributed", "delta_emissions", "emissions"],
    ))?;

    for (t, year) in series.years.iter().enumerate() {
        let mut record = vec![year.to_string()];
        record.extend(series.values.row(t).iter().map(|v| number(*v)));
        record.push(number(series.unattributed[t]));
        record.push(number(series.delta[t]));
        record.push(number(series.emissions[t + 1]));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write national multiplicative factors as one row per interval.
///
/// Columns: `year`, `total_ratio`, one per driver, `residual`.
pub fn write_multiplicative<W: Write>(writer: W, table: &MultiplicativeTable) -> IoResult<()> {
    let mut csv_writer = Writer::from_writer(writer);
    let mut columns = vec!["year".to_string(), "total_ratio".to_string()];
    columns.extend(table.drivers.iter().cloned());
    columns.push("residual".to_string());
    csv_writer.write_record(&columns)?;

    for (t, year) in table.years.iter().enumerate() {
        let mut record = vec![year.to_string(), number(table.total_ratio[t])];
        record.extend(table.factors.row(t).iter().map(|v| number(*v)));
        record.push(number(table.residual[t]));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn number(value: FloatValue) -> String {
    value.to_string()
}

fn header(key: &str, drivers: &[String], trailing: &[&str]) -> Vec<String> {
    std::iter::once(key.to_string())
        .chain(drivers.iter().cloned())
        .chain(trailing.iter().map(|c| c.to_string()))
        .collect()
}
