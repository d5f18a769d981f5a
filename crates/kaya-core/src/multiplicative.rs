//! Multiplicative LMDI decomposition of national emissions.
//!
//! The multiplicative form expresses the ratio of national emissions between
//! two years as a product of driver factors:
//!
//! $$ \frac{V_T}{V_0} = \prod_k D_k, \qquad
//!    D_k = \exp\left( \frac{\sum_i L(E_{i,T}, E_{i,0}) \ln(x_{i,k,T}/x_{i,k,0})}{L(V_T, V_0)} \right) $$
//!
//! The numerator is the national additive contribution of driver $k$, so the
//! factors are derived from an additive [`DecompositionTable`] rather than
//! recomputed from the panel.

use crate::decompose::{decompose, DecompositionOptions};
use crate::errors::{KayaError, KayaResult};
use crate::identity::KayaIdentity;
use crate::log_mean::log_mean;
use crate::panel::Panel;
use crate::table::DecompositionTable;
use crate::{FloatValue, Year};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Per-interval multiplicative factors at the national level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplicativeTable {
    /// Interval end years
    pub years: Vec<Year>,
    pub drivers: Vec<String>,
    /// `V_T / V_0` per interval
    pub total_ratio: Array1<FloatValue>,
    /// interval x driver
    pub factors: Array2<FloatValue>,
    /// Factor for change left unattributed by the zero-emission policy
    pub residual: Array1<FloatValue>,
}

impl MultiplicativeTable {
    /// Convert the national additive contributions into factors.
    ///
    /// Fails if national emissions are zero in any analysis year.
    pub fn from_additive(table: &DecompositionTable) -> KayaResult<Self> {
        let national = table.national_series();
        let n_intervals = national.years.len();
        let mut total_ratio = Array1::zeros(n_intervals);
        let mut factors = Array2::zeros((n_intervals, national.drivers.len()));
        let mut residual = Array1::zeros(n_intervals);

        for (i, year) in table.years().iter().enumerate() {
            let value = national.emissions[i];
            if value <= 0.0 {
                return Err(KayaError::NonPositiveAggregate { year: *year, value });
            }
        }

        for t in 0..n_intervals {
            let v0 = national.emissions[t];
            let v1 = national.emissions[t + 1];
            let weight = log_mean(v0, v1);

            total_ratio[t] = v1 / v0;
            factors
                .row_mut(t)
                .assign(&national.values.row(t).mapv(|c| (c / weight).exp()));
            residual[t] = (national.unattributed[t] / weight).exp();
        }

        Ok(Self {
            years: national.years,
            drivers: national.drivers,
            total_ratio,
            factors,
            residual,
        })
    }

    pub fn factor(&self, year: Year, driver: &str) -> Option<FloatValue> {
        let t = self.years.iter().position(|y| *y == year)?;
        let k = self.drivers.iter().position(|x| x == driver)?;
        Some(self.factors[[t, k]])
    }

    /// Chained factor per driver over the whole window
    pub fn cumulative_factors(&self) -> Array1<FloatValue> {
        self.factors.map_axis(Axis(0), |column| column.product())
    }

    /// `V_end / V_base`
    pub fn cumulative_ratio(&self) -> FloatValue {
        self.total_ratio.product()
    }

    pub fn cumulative_residual(&self) -> FloatValue {
        self.residual.product()
    }
}

/// Decompose national emission ratios into multiplicative driver factors.
///
/// Runs the additive decomposition with the same inputs and converts the
/// national totals; see [`MultiplicativeTable::from_additive`].
pub fn decompose_multiplicative(
    panel: &Panel,
    identity: &KayaIdentity,
    options: &DecompositionOptions,
) -> KayaResult<MultiplicativeTable> {
    MultiplicativeTable::from_additive(&decompose(panel, identity, options)?)
}
