//! Additive LMDI-I decomposition.
//!
//! For every sector $i$, interval $t \to t+1$ and driver $k$:
//!
//! $$ \Delta E_{i,k} = L(E_{i,t}, E_{i,t+1}) \cdot \ln\frac{x_{i,k,t+1}}{x_{i,k,t}} $$
//!
//! Because $\prod_k x_{i,k} = E_i$, the log changes sum to
//! $\ln(E_{i,t+1}/E_{i,t})$ and the weighted sum collapses to
//! $E_{i,t+1} - E_{i,t}$ exactly.
//!
//! # Zero emissions
//!
//! The logarithm is undefined when a sector has zero emissions at either end
//! of an interval. Such transitions are resolved by a [`ZeroEmissionPolicy`]
//! and always recorded as a [`ZeroEmissionTransition`] on the result.

use crate::drivers::DriverTable;
use crate::errors::KayaResult;
use crate::identity::KayaIdentity;
use crate::log_mean::{log_mean, log_ratio};
use crate::panel::Panel;
use crate::table::DecompositionTable;
use crate::{FloatValue, Year};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// How an interval with zero emissions at an endpoint is decomposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroEmissionPolicy {
    /// Limit of the LMDI formula as the zero endpoint approaches 0.
    ///
    /// $L(0, E) = 0$, so drivers that stay positive contribute nothing and
    /// the whole change goes to the drivers that are zero or undefined at an
    /// endpoint, split equally between them. If there is no such driver the
    /// change is left unattributed.
    #[default]
    LimitValue,
    /// Contribute nothing to any driver; the change is left unattributed.
    Exclude,
}

impl fmt::Display for ZeroEmissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroEmissionPolicy::LimitValue => write!(f, "limit_value"),
            ZeroEmissionPolicy::Exclude => write!(f, "exclude"),
        }
    }
}

/// Options for [`decompose`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionOptions {
    /// First year of the analysis window. Defaults to the first panel year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_year: Option<Year>,

    /// Last year of the analysis window. Defaults to the last panel year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_year: Option<Year>,

    pub zero_emission_policy: ZeroEmissionPolicy,

    /// Relative tolerance for the driver product matching emissions.
    ///
    /// Default: 1e-6
    pub identity_tolerance: FloatValue,
}

impl Default for DecompositionOptions {
    fn default() -> Self {
        Self {
            base_year: None,
            end_year: None,
            zero_emission_policy: ZeroEmissionPolicy::default(),
            identity_tolerance: 1e-6,
        }
    }
}

impl DecompositionOptions {
    pub fn with_years(mut self, base_year: Year, end_year: Year) -> Self {
        self.base_year = Some(base_year);
        self.end_year = Some(end_year);
        self
    }

    pub fn with_policy(mut self, policy: ZeroEmissionPolicy) -> Self {
        self.zero_emission_policy = policy;
        self
    }
}

/// A transition that needed the zero-emission fallback.
///
/// This is a warning, not an error: the decomposition proceeds according to
/// `policy` and `attributed_to` lists the drivers that received the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroEmissionTransition {
    pub sector: String,
    pub from_year: Year,
    pub to_year: Year,
    pub start_emissions: FloatValue,
    pub end_emissions: FloatValue,
    pub policy: ZeroEmissionPolicy,
    pub attributed_to: Vec<String>,
}

/// Decompose year-over-year emission changes into driver contributions.
///
/// The analysis window runs from `options.base_year` to `options.end_year`
/// (panel bounds by default) and must cover at least two contiguous years.
/// Drivers are derived from `panel` through `identity` and validated before
/// any weights are computed, so a returned table always satisfies
/// additivity.
pub fn decompose(
    panel: &Panel,
    identity: &KayaIdentity,
    options: &DecompositionOptions,
) -> KayaResult<DecompositionTable> {
    let start = options.base_year.unwrap_or_else(|| panel.first_year());
    let end = options.end_year.unwrap_or_else(|| panel.last_year());
    let years = panel.window(start, end)?;

    let drivers = DriverTable::derive(panel, identity, &years)?;
    drivers.validate(options.identity_tolerance)?;

    let table = decompose_drivers(&drivers, options.zero_emission_policy);
    info!(
        sectors = table.sectors().len(),
        start,
        end,
        zero_emission_transitions = table.zero_emission_transitions().len(),
        "Completed LMDI decomposition"
    );
    Ok(table)
}

/// Decompose an already validated driver table.
pub(crate) fn decompose_drivers(
    drivers: &DriverTable,
    policy: ZeroEmissionPolicy,
) -> DecompositionTable {
    let emissions = drivers.emissions();
    let values = drivers.values();
    let (n_sectors, n_years, n_drivers) = values.dim();
    let n_intervals = n_years.saturating_sub(1);

    let mut contributions = Array3::zeros((n_sectors, n_intervals, n_drivers));
    let mut unattributed = Array2::zeros((n_sectors, n_intervals));
    let mut transitions = Vec::new();

    for s in 0..n_sectors {
        for t in 0..n_intervals {
            let e0 = emissions[[s, t]];
            let e1 = emissions[[s, t + 1]];

            if e0 > 0.0 && e1 > 0.0 {
                let weight = log_mean(e0, e1);
                for k in 0..n_drivers {
                    contributions[[s, t, k]] =
                        weight * log_ratio(values[[s, t + 1, k]], values[[s, t, k]]);
                }
                debug!(
                    sector = %drivers.sectors()[s],
                    to_year = drivers.years()[t + 1],
                    weight,
                    "Decomposed interval"
                );
                continue;
            }

            // At least one endpoint has zero emissions
            let delta = e1 - e0;
            let degenerate: Vec<usize> = match policy {
                ZeroEmissionPolicy::LimitValue => (0..n_drivers)
                    .filter(|&k| !is_regular(values[[s, t, k]]) || !is_regular(values[[s, t + 1, k]]))
                    .collect(),
                ZeroEmissionPolicy::Exclude => Vec::new(),
            };

            if degenerate.is_empty() {
                unattributed[[s, t]] = delta;
            } else {
                let share = delta / degenerate.len() as FloatValue;
                for &k in &degenerate {
                    contributions[[s, t, k]] = share;
                }
            }

            let transition = ZeroEmissionTransition {
                sector: drivers.sectors()[s].clone(),
                from_year: drivers.years()[t],
                to_year: drivers.years()[t + 1],
                start_emissions: e0,
                end_emissions: e1,
                policy,
                attributed_to: degenerate
                    .iter()
                    .map(|&k| drivers.drivers()[k].clone())
                    .collect(),
            };
            warn!(
                sector = %transition.sector,
                from_year = transition.from_year,
                to_year = transition.to_year,
                start_emissions = e0,
                end_emissions = e1,
                policy = %policy,
                "Zero emissions at an interval endpoint; applying fallback"
            );
            transitions.push(transition);
        }
    }

    DecompositionTable::new(
        drivers.sectors().to_vec(),
        drivers.drivers().to_vec(),
        drivers.years().to_vec(),
        drivers.unit().to_string(),
        emissions.to_owned(),
        contributions,
        unattributed,
        transitions,
    )
}

fn is_regular(value: FloatValue) -> bool {
    value.is_finite() && value > 0.0
}
