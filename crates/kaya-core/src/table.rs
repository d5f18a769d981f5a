//! Decomposition results.
//!
//! A [`DecompositionTable`] holds the additive contribution of every driver
//! for every sector and interval. Intervals are labelled by their end year:
//! the entry for 1991 is the change from 1990 to 1991.

use crate::aggregate::{CumulativeTotals, NationalSeries, SectorTotals};
use crate::decompose::ZeroEmissionTransition;
use crate::errors::{KayaError, KayaResult};
use crate::multiplicative::MultiplicativeTable;
use crate::{FloatValue, Year};
use is_close::is_close;
use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

/// Contribution of one driver to one sector's change over one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionRecord {
    pub sector: String,
    /// End year of the interval
    pub year: Year,
    pub driver: String,
    pub contribution: FloatValue,
}

/// Sector x interval x driver contributions, in emission units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionTable {
    sectors: Vec<String>,
    drivers: Vec<String>,
    /// Analysis years, including the base year
    years: Vec<Year>,
    unit: String,
    /// sector x year
    emissions: Array2<FloatValue>,
    /// sector x interval x driver
    contributions: Array3<FloatValue>,
    /// sector x interval, non-zero only for excluded zero-emission transitions
    unattributed: Array2<FloatValue>,
    transitions: Vec<ZeroEmissionTransition>,
}

impl DecompositionTable {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        sectors: Vec<String>,
        drivers: Vec<String>,
        years: Vec<Year>,
        unit: String,
        emissions: Array2<FloatValue>,
        contributions: Array3<FloatValue>,
        unattributed: Array2<FloatValue>,
        transitions: Vec<ZeroEmissionTransition>,
    ) -> Self {
        Self {
            sectors,
            drivers,
            years,
            unit,
            emissions,
            contributions,
            unattributed,
            transitions,
        }
    }

    pub fn sectors(&self) -> &[String] {
        &self.sectors
    }

    pub fn drivers(&self) -> &[String] {
        &self.drivers
    }

    /// Analysis years including the base year
    pub fn years(&self) -> &[Year] {
        &self.years
    }

    /// End year of every interval
    pub fn interval_years(&self) -> &[Year] {
        &self.years[1..]
    }

    /// `(from, to)` year pairs
    pub fn intervals(&self) -> impl Iterator<Item = (Year, Year)> + '_ {
        self.years.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Emission levels, sector x year
    pub fn emissions(&self) -> ArrayView2<'_, FloatValue> {
        self.emissions.view()
    }

    /// Contributions, sector x interval x driver
    pub fn contributions(&self) -> ArrayView3<'_, FloatValue> {
        self.contributions.view()
    }

    /// Change left unattributed by the zero-emission policy, sector x interval
    pub fn unattributed(&self) -> ArrayView2<'_, FloatValue> {
        self.unattributed.view()
    }

    /// Emission change per sector and interval
    pub fn delta_emissions(&self) -> Array2<FloatValue> {
        &self.emissions.slice(s![.., 1..]) - &self.emissions.slice(s![.., ..-1])
    }

    pub fn zero_emission_transitions(&self) -> &[ZeroEmissionTransition] {
        &self.transitions
    }

    /// Contribution of `driver` to `sector`'s change over the interval ending in `year`
    pub fn contribution(&self, sector: &str, year: Year, driver: &str) -> Option<FloatValue> {
        let s = self.sectors.iter().position(|x| x == sector)?;
        let t = self.interval_years().iter().position(|y| *y == year)?;
        let k = self.drivers.iter().position(|x| x == driver)?;
        Some(self.contributions[[s, t, k]])
    }

    /// Long-format rows ordered by sector, year, driver
    pub fn records(&self) -> Vec<ContributionRecord> {
        self.contributions
            .indexed_iter()
            .map(|((s, t, k), contribution)| ContributionRecord {
                sector: self.sectors[s].clone(),
                year: self.years[t + 1],
                driver: self.drivers[k].clone(),
                contribution: *contribution,
            })
            .collect()
    }

    /// Contributions summed over all intervals, per sector
    pub fn sector_totals(&self) -> SectorTotals {
        SectorTotals {
            sectors: self.sectors.clone(),
            drivers: self.drivers.clone(),
            unit: self.unit.clone(),
            values: self.contributions.sum_axis(Axis(1)),
            delta: self.delta_emissions().sum_axis(Axis(1)),
            unattributed: self.unattributed.sum_axis(Axis(1)),
        }
    }

    /// Contributions summed over all sectors, per interval
    pub fn national_series(&self) -> NationalSeries {
        NationalSeries {
            years: self.interval_years().to_vec(),
            drivers: self.drivers.clone(),
            unit: self.unit.clone(),
            values: self.contributions.sum_axis(Axis(0)),
            delta: self.delta_emissions().sum_axis(Axis(0)),
            unattributed: self.unattributed.sum_axis(Axis(0)),
            emissions: self.emissions.sum_axis(Axis(0)),
        }
    }

    /// Contributions summed over all sectors and intervals
    pub fn cumulative(&self) -> CumulativeTotals {
        CumulativeTotals {
            drivers: self.drivers.clone(),
            unit: self.unit.clone(),
            values: self.contributions.sum_axis(Axis(0)).sum_axis(Axis(0)),
            delta: self.delta_emissions().sum(),
            unattributed: self.unattributed.sum(),
        }
    }

    /// Multiplicative view of the national decomposition
    pub fn multiplicative(&self) -> KayaResult<MultiplicativeTable> {
        MultiplicativeTable::from_additive(self)
    }

    /// Verify that contributions reconstruct every emission change.
    ///
    /// `tolerance` is used both as relative tolerance and as absolute
    /// tolerance in emission units, so intervals with no change pass when the
    /// contributions cancel to rounding error.
    pub fn check_additivity(&self, tolerance: FloatValue) -> KayaResult<()> {
        let delta = self.delta_emissions();
        for ((s, t), expected) in delta.indexed_iter() {
            let explained =
                self.contributions.slice(s![s, t, ..]).sum() + self.unattributed[[s, t]];
            if !is_close!(explained, *expected, rel_tol = tolerance, abs_tol = tolerance) {
                return Err(KayaError::AdditivityViolation {
                    sector: self.sectors[s].clone(),
                    year: self.years[t + 1],
                    delta: *expected,
                    explained,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::{decompose, DecompositionOptions};
    use crate::identity::KayaIdentity;
    use crate::panel::{Panel, PanelRow};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn table() -> DecompositionTable {
        let identity = KayaIdentity::new("E", "Mt CO2e")
            .variable("x", "x")
            .ratio("y", "E", "x");
        let mut rows = Vec::new();
        for (sector, series) in [
            ("A", [(2.0, 10.0), (3.0, 12.0), (3.0, 9.0)]),
            ("B", [(1.0, 4.0), (1.5, 4.0), (2.0, 7.0)]),
        ] {
            for (i, (x, e)) in series.into_iter().enumerate() {
                rows.push(PanelRow::new(sector, 2010 + i as Year, "x", x));
                rows.push(PanelRow::new(sector, 2010 + i as Year, "E", e));
            }
        }
        let panel = Panel::from_rows(rows).unwrap();
        decompose(&panel, &identity, &DecompositionOptions::default()).unwrap()
    }

    #[test]
    fn test_interval_labels() {
        let table = table();
        assert_eq!(table.years(), &[2010, 2011, 2012]);
        assert_eq!(table.interval_years(), &[2011, 2012]);
        assert_eq!(
            table.intervals().collect::<Vec<_>>(),
            vec![(2010, 2011), (2011, 2012)]
        );
        assert!(table.contribution("A", 2010, "x").is_none());
    }

    #[test]
    fn test_delta_emissions() {
        let table = table();
        assert_eq!(table.delta_emissions(), array![[2.0, -3.0], [0.0, 3.0]]);
    }

    #[test]
    fn test_records_are_long_format() {
        let table = table();
        let records = table.records();

        assert_eq!(records.len(), 2 * 2 * 2);
        assert_eq!(records[0].sector, "A");
        assert_eq!(records[0].year, 2011);
        assert_eq!(records[0].driver, "x");
        assert_eq!(records[3].year, 2012);
        assert_eq!(records[3].driver, "y");
        assert_eq!(
            records[3].contribution,
            table.contribution("A", 2012, "y").unwrap()
        );
    }

    #[test]
    fn test_aggregations_agree() {
        let table = table();
        let by_sector = table.sector_totals().national();
        let by_year = table.national_series().cumulative();
        let cumulative = table.cumulative();

        for k in 0..2 {
            assert_relative_eq!(by_sector.values[k], cumulative.values[k], epsilon = 1e-12);
            assert_relative_eq!(by_year.values[k], cumulative.values[k], epsilon = 1e-12);
        }
        // 2010 total 14, 2012 total 16
        assert_relative_eq!(cumulative.delta, 2.0, epsilon = 1e-12);
        assert_relative_eq!(cumulative.explained(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_national_series_levels() {
        let series = table().national_series();
        assert_eq!(series.years, vec![2011, 2012]);
        assert_eq!(series.emissions, array![14.0, 16.0, 16.0]);
        assert_eq!(series.delta, array![2.0, 0.0]);
    }

    #[test]
    fn test_check_additivity_detects_tampering() {
        let mut table = table();
        assert!(table.check_additivity(1e-9).is_ok());

        table.contributions[[1, 1, 0]] += 0.5;
        match table.check_additivity(1e-9).unwrap_err() {
            KayaError::AdditivityViolation { sector, year, .. } => {
                assert_eq!(sector, "B");
                assert_eq!(year, 2012);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_table_json_roundtrip() {
        let table = table();
        let json = serde_json::to_string(&table).unwrap();
        let deserialized: DecompositionTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table, deserialized);
    }
}
