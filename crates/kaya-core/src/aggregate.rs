//! Aggregated views of a decomposition.
//!
//! LMDI-I is additive across both sectors and time, so any of these views can
//! be obtained by summing the underlying contributions:
//!
//! - [`SectorTotals`]: summed over intervals (sector x driver)
//! - [`NationalSeries`]: summed over sectors (interval x driver)
//! - [`CumulativeTotals`]: summed over both (driver)

use crate::{FloatValue, Year};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Cumulative contributions per sector over the analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorTotals {
    pub sectors: Vec<String>,
    pub drivers: Vec<String>,
    pub unit: String,
    /// sector x driver
    pub values: Array2<FloatValue>,
    /// Emission change per sector over the window
    pub delta: Array1<FloatValue>,
    pub unattributed: Array1<FloatValue>,
}

impl SectorTotals {
    pub fn get(&self, sector: &str, driver: &str) -> Option<FloatValue> {
        let s = self.sectors.iter().position(|x| x == sector)?;
        let k = self.drivers.iter().position(|x| x == driver)?;
        Some(self.values[[s, k]])
    }

    /// Sum over sectors
    pub fn national(&self) -> CumulativeTotals {
        CumulativeTotals {
            drivers: self.drivers.clone(),
            unit: self.unit.clone(),
            values: self.values.sum_axis(Axis(0)),
            delta: self.delta.sum(),
            unattributed: self.unattributed.sum(),
        }
    }
}

/// National contributions per interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalSeries {
    /// Interval end years
    pub years: Vec<Year>,
    pub drivers: Vec<String>,
    pub unit: String,
    /// interval x driver
    pub values: Array2<FloatValue>,
    /// National emission change per interval
    pub delta: Array1<FloatValue>,
    pub unattributed: Array1<FloatValue>,
    /// National emission levels for every analysis year, base year first
    pub emissions: Array1<FloatValue>,
}

impl NationalSeries {
    pub fn get(&self, year: Year, driver: &str) -> Option<FloatValue> {
        let t = self.years.iter().position(|y| *y == year)?;
        let k = self.drivers.iter().position(|x| x == driver)?;
        Some(self.values[[t, k]])
    }

    /// Sum over intervals
    pub fn cumulative(&self) -> CumulativeTotals {
        CumulativeTotals {
            drivers: self.drivers.clone(),
            unit: self.unit.clone(),
            values: self.values.sum_axis(Axis(0)),
            delta: self.delta.sum(),
            unattributed: self.unattributed.sum(),
        }
    }
}

/// Contributions per driver over all sectors and intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeTotals {
    pub drivers: Vec<String>,
    pub unit: String,
    pub values: Array1<FloatValue>,
    /// Total emission change
    pub delta: FloatValue,
    pub unattributed: FloatValue,
}

impl CumulativeTotals {
    pub fn get(&self, driver: &str) -> Option<FloatValue> {
        let k = self.drivers.iter().position(|x| x == driver)?;
        Some(self.values[k])
    }

    /// Sum of driver contributions and unattributed change
    pub fn explained(&self) -> FloatValue {
        self.values.sum() + self.unattributed
    }

    /// `(driver, contribution)` pairs in driver order
    pub fn iter(&self) -> impl Iterator<Item = (&str, FloatValue)> + '_ {
        self.drivers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sector_totals() -> SectorTotals {
        SectorTotals {
            sectors: vec!["Industry".to_string(), "Transport".to_string()],
            drivers: vec!["activity".to_string(), "structure".to_string()],
            unit: "Mt CO2e".to_string(),
            values: array![[1.5, -0.5], [2.0, 1.0]],
            delta: array![1.0, 3.0],
            unattributed: array![0.0, 0.0],
        }
    }

    #[test]
    fn test_sector_totals_lookup() {
        let totals = sector_totals();
        assert_eq!(totals.get("Transport", "structure"), Some(1.0));
        assert_eq!(totals.get("Transport", "efficiency"), None);
        assert_eq!(totals.get("Agriculture", "activity"), None);
    }

    #[test]
    fn test_sector_totals_national() {
        let national = sector_totals().national();
        assert_eq!(national.values, array![3.5, 0.5]);
        assert_eq!(national.delta, 4.0);
        assert_eq!(national.explained(), 4.0);
        assert_eq!(national.get("activity"), Some(3.5));
        assert_eq!(
            national.iter().collect::<Vec<_>>(),
            vec![("activity", 3.5), ("structure", 0.5)]
        );
    }

    #[test]
    fn test_national_series_cumulative() {
        let series = NationalSeries {
            years: vec![1991, 1992],
            drivers: vec!["activity".to_string()],
            unit: "Mt CO2e".to_string(),
            values: array![[2.0], [-1.0]],
            delta: array![2.5, -1.0],
            unattributed: array![0.5, 0.0],
            emissions: array![10.0, 12.5, 11.5],
        };

        assert_eq!(series.get(1992, "activity"), Some(-1.0));
        assert_eq!(series.get(1990, "activity"), None);

        let cumulative = series.cumulative();
        assert_eq!(cumulative.values, array![1.0]);
        assert_eq!(cumulative.delta, 1.5);
        assert_eq!(cumulative.unattributed, 0.5);
        assert_eq!(cumulative.explained(), 1.5);
    }
}
