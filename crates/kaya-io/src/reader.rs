//! Long-format CSV reader.
//!
//! Every structural problem is fatal and reported with its location:
//! missing columns by name, unparsable fields by line, column, sector and
//! year. Empty fields and the usual null markers (`NA`, `NaN`, `null`, `.`)
//! become missing values, which the core rejects only if they are needed.

use crate::errors::{IoError, IoResult};
use crate::schema::PanelSchema;
use csv::{ReaderBuilder, StringRecord, Trim};
use kaya_core::{FloatValue, Panel, PanelRow, Year};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

const NULL_MARKERS: [&str; 5] = ["", "na", "nan", "null", "."];

/// Read a panel from a CSV file.
pub fn read_panel_file(path: impl AsRef<Path>, schema: &PanelSchema) -> IoResult<Panel> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Reading panel");
    read_panel(BufReader::new(file), schema)
}

/// Read a panel from any CSV source with a header row.
pub fn read_panel<R: Read>(reader: R, schema: &PanelSchema) -> IoResult<Panel> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(schema.delimiter_byte()?)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = ColumnIndices::resolve(&headers, schema)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(columns.parse_row(&record, schema)?);
    }

    let panel = Panel::from_rows(rows)?;
    info!(
        sectors = panel.sectors().len(),
        years = panel.years().len(),
        variables = panel.variables().len(),
        observations = panel.observation_count(),
        "Loaded panel"
    );
    Ok(panel)
}

/// Positions of the schema columns in the header row.
struct ColumnIndices {
    sector: usize,
    year: usize,
    variable: usize,
    value: usize,
}

impl ColumnIndices {
    fn resolve(headers: &StringRecord, schema: &PanelSchema) -> IoResult<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == column)
                .ok_or_else(|| IoError::MissingColumn {
                    column: column.to_string(),
                    found: headers.iter().collect::<Vec<_>>().join(", "),
                })
        };
        Ok(Self {
            sector: find(&schema.sector_column)?,
            year: find(&schema.year_column)?,
            variable: find(&schema.variable_column)?,
            value: find(&schema.value_column)?,
        })
    }

    fn parse_row(&self, record: &StringRecord, schema: &PanelSchema) -> IoResult<PanelRow> {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |index: usize| record.get(index).unwrap_or_default();

        let sector = field(self.sector);
        let raw_year = field(self.year);
        let variable = field(self.variable);
        let raw_value = field(self.value);

        let parse_error = |column: &str, value: &str, context: String| IoError::Parse {
            line,
            column: column.to_string(),
            value: value.to_string(),
            context,
        };

        if sector.is_empty() {
            return Err(parse_error(
                &schema.sector_column,
                sector,
                format!("year {}", raw_year),
            ));
        }
        if variable.is_empty() {
            return Err(parse_error(
                &schema.variable_column,
                variable,
                format!("sector '{}', year {}", sector, raw_year),
            ));
        }

        let year = parse_year(raw_year).ok_or_else(|| {
            parse_error(&schema.year_column, raw_year, format!("sector '{}'", sector))
        })?;

        let value = if is_null(raw_value) {
            None
        } else {
            Some(raw_value.parse::<FloatValue>().map_err(|_| {
                parse_error(
                    &schema.value_column,
                    raw_value,
                    format!("sector '{}', year {}, variable '{}'", sector, year, variable),
                )
            })?)
        };

        Ok(PanelRow {
            sector: sector.to_string(),
            year,
            variable: variable.to_string(),
            value,
        })
    }
}

/// Accepts integer years and float-formatted integers such as `1990.0`
fn parse_year(raw: &str) -> Option<Year> {
    raw.parse::<Year>().ok().or_else(|| {
        let value = raw.parse::<f64>().ok()?;
        (value.fract() == 0.0 && value.abs() < Year::MAX as f64).then_some(value as Year)
    })
}

fn is_null(raw: &str) -> bool {
    NULL_MARKERS.iter().any(|marker| raw.eq_ignore_ascii_case(marker))
}
