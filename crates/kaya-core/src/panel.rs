//! Sector x year x variable panel.
//!
//! The panel is the typed form of the long-format input table
//! (`sector, year, variable, value`). Rows are indexed once into a dense cube
//! so that later steps never look values up by column name.
//!
//! Missing observations (null values, or rows that were never supplied) are
//! stored as NaN and surface as `None` from [`Panel::value`].

use crate::errors::{KayaError, KayaResult};
use crate::{FloatValue, Year};
use ndarray::{Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A single observation of the long-format panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    pub sector: String,
    pub year: Year,
    pub variable: String,
    /// `None` when the source value was null
    pub value: Option<FloatValue>,
}

impl PanelRow {
    pub fn new(
        sector: impl Into<String>,
        year: Year,
        variable: impl Into<String>,
        value: FloatValue,
    ) -> Self {
        Self {
            sector: sector.into(),
            year,
            variable: variable.into(),
            value: Some(value),
        }
    }

    /// An observation that is present in the source but has no value
    pub fn missing(sector: impl Into<String>, year: Year, variable: impl Into<String>) -> Self {
        Self {
            sector: sector.into(),
            year,
            variable: variable.into(),
            value: None,
        }
    }
}

/// Immutable, indexed panel of yearly per-sector values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Sectors in order of first appearance
    sectors: Vec<String>,
    /// Sorted, de-duplicated years
    years: Vec<Year>,
    /// Variables in order of first appearance
    variables: Vec<String>,
    /// sector x year x variable, NaN where missing
    values: Array3<FloatValue>,
}

impl Panel {
    /// Index long-format rows into a panel.
    ///
    /// Fails if there are no rows or if the same `(sector, year, variable)`
    /// is observed twice.
    pub fn from_rows<I>(rows: I) -> KayaResult<Self>
    where
        I: IntoIterator<Item = PanelRow>,
    {
        let rows: Vec<PanelRow> = rows.into_iter().collect();
        if rows.is_empty() {
            return Err(KayaError::EmptyPanel);
        }

        let mut sectors: Vec<String> = Vec::new();
        let mut sector_index: HashMap<String, usize> = HashMap::new();
        let mut variables: Vec<String> = Vec::new();
        let mut variable_index: HashMap<String, usize> = HashMap::new();

        for row in &rows {
            if !sector_index.contains_key(&row.sector) {
                sector_index.insert(row.sector.clone(), sectors.len());
                sectors.push(row.sector.clone());
            }
            if !variable_index.contains_key(&row.variable) {
                variable_index.insert(row.variable.clone(), variables.len());
                variables.push(row.variable.clone());
            }
        }

        let mut years: Vec<Year> = rows.iter().map(|row| row.year).collect();
        years.sort_unstable();
        years.dedup();
        let year_index: HashMap<Year, usize> =
            years.iter().enumerate().map(|(i, y)| (*y, i)).collect();

        let shape = (sectors.len(), years.len(), variables.len());
        let mut values = Array3::from_elem(shape, FloatValue::NAN);
        let mut seen = Array3::from_elem(shape, false);

        for row in rows {
            let idx = [
                sector_index[&row.sector],
                year_index[&row.year],
                variable_index[&row.variable],
            ];
            if seen[idx] {
                return Err(KayaError::DuplicateObservation {
                    sector: row.sector,
                    year: row.year,
                    variable: row.variable,
                });
            }
            seen[idx] = true;
            values[idx] = row.value.unwrap_or(FloatValue::NAN);
        }

        debug!(
            sectors = sectors.len(),
            years = years.len(),
            variables = variables.len(),
            "Indexed panel"
        );

        Ok(Self {
            sectors,
            years,
            variables,
            values,
        })
    }

    pub fn sectors(&self) -> &[String] {
        &self.sectors
    }

    pub fn years(&self) -> &[Year] {
        &self.years
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn first_year(&self) -> Year {
        self.years[0]
    }

    pub fn last_year(&self) -> Year {
        self.years[self.years.len() - 1]
    }

    /// Number of non-missing observations
    pub fn observation_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Look up a single value. Returns `None` for unknown keys and for
    /// missing observations.
    pub fn value(&self, sector: &str, year: Year, variable: &str) -> Option<FloatValue> {
        let s = self.sector_index(sector)?;
        let y = self.year_index(year)?;
        let v = self.variable_index(variable)?;
        let value = self.values[[s, y, v]];
        (!value.is_nan()).then_some(value)
    }

    pub fn sector_index(&self, sector: &str) -> Option<usize> {
        self.sectors.iter().position(|s| s == sector)
    }

    pub fn year_index(&self, year: Year) -> Option<usize> {
        self.years.binary_search(&year).ok()
    }

    pub fn variable_index(&self, variable: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == variable)
    }

    /// All values of one variable as a sector x year view
    pub fn variable_values(&self, variable: &str) -> KayaResult<ArrayView2<'_, FloatValue>> {
        let v = self
            .variable_index(variable)
            .ok_or_else(|| KayaError::MissingVariable(variable.to_string()))?;
        Ok(self.values.index_axis(Axis(2), v))
    }

    /// Resolve an analysis window to the list of years it covers.
    ///
    /// Both endpoints must be present in the panel, `start` must precede
    /// `end`, and the years in between must be contiguous.
    pub fn window(&self, start: Year, end: Year) -> KayaResult<Vec<Year>> {
        if start >= end {
            return Err(KayaError::InvalidYearRange {
                start,
                end,
                reason: "at least two years are needed to form a transition".to_string(),
            });
        }
        let (Some(first), Some(last)) = (self.year_index(start), self.year_index(end)) else {
            return Err(KayaError::InvalidYearRange {
                start,
                end,
                reason: format!(
                    "panel covers {}-{}",
                    self.first_year(),
                    self.last_year()
                ),
            });
        };

        let years = self.years[first..=last].to_vec();
        for pair in years.windows(2) {
            if pair[1] != pair[0] + 1 {
                return Err(KayaError::NonContiguousYears {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(years)
    }
}
