//! Driver values derived from a panel.
//!
//! [`DriverTable::derive`] evaluates every driver of a [`KayaIdentity`] for
//! every sector and year of an analysis window. [`DriverTable::validate`]
//! then enforces the preconditions of the logarithmic decomposition:
//!
//! - emissions are present, finite and non-negative
//! - where emissions are positive, every driver is finite and strictly positive
//! - the product of the drivers reconstructs emissions within tolerance
//!
//! Sector-years with zero emissions may have zero drivers and `0/0` ratios;
//! the transitions touching them are handled by the zero-emission policy.
//! The raw variables read by the identity must still be present, finite and
//! non-negative in those years.

use crate::errors::{KayaError, KayaResult};
use crate::identity::KayaIdentity;
use crate::panel::Panel;
use crate::{FloatValue, Year};
use is_close::is_close;
use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};
use tracing::debug;

/// Driver and emission levels for an analysis window.
#[derive(Debug, Clone)]
pub struct DriverTable {
    sectors: Vec<String>,
    years: Vec<Year>,
    drivers: Vec<String>,
    formulas: Vec<String>,
    /// Panel variables read by the identity, emissions first
    inputs: Vec<String>,
    emissions_variable: String,
    unit: String,
    /// sector x year
    emissions: Array2<FloatValue>,
    /// sector x year x driver
    values: Array3<FloatValue>,
    /// sector x year x input
    input_values: Array3<FloatValue>,
}

impl DriverTable {
    /// Evaluate the identity's drivers for `years` (which must be panel years).
    pub fn derive(panel: &Panel, identity: &KayaIdentity, years: &[Year]) -> KayaResult<Self> {
        identity.validate()?;

        let year_indices = years
            .iter()
            .map(|year| {
                panel
                    .year_index(*year)
                    .ok_or_else(|| KayaError::InvalidYearRange {
                        start: years[0],
                        end: years[years.len() - 1],
                        reason: format!("year {} is not in the panel", year),
                    })
            })
            .collect::<KayaResult<Vec<_>>>()?;

        let emissions_all = panel.variable_values(&identity.emissions)?;
        let emissions = select_years(&emissions_all, &year_indices);

        let n_sectors = panel.sectors().len();
        let mut values = Array3::from_elem(
            (n_sectors, years.len(), identity.len()),
            FloatValue::NAN,
        );

        for (k, driver) in identity.drivers.iter().enumerate() {
            let numerator = select_years(&panel.variable_values(&driver.numerator)?, &year_indices);
            let derived = match &driver.denominator {
                Some(denominator) => {
                    let denominator =
                        select_years(&panel.variable_values(denominator)?, &year_indices);
                    numerator / denominator
                }
                None => numerator,
            };
            values.index_axis_mut(Axis(2), k).assign(&derived);
        }

        let inputs = identity.required_variables();
        let mut input_values =
            Array3::from_elem((n_sectors, years.len(), inputs.len()), FloatValue::NAN);
        for (v, variable) in inputs.iter().enumerate() {
            input_values
                .index_axis_mut(Axis(2), v)
                .assign(&select_years(&panel.variable_values(variable)?, &year_indices));
        }

        debug!(
            sectors = n_sectors,
            years = years.len(),
            drivers = identity.len(),
            "Derived driver table"
        );

        Ok(Self {
            sectors: panel.sectors().to_vec(),
            years: years.to_vec(),
            drivers: identity.driver_names(),
            formulas: identity.drivers.iter().map(|d| d.formula()).collect(),
            inputs: inputs.iter().map(|v| v.to_string()).collect(),
            emissions_variable: identity.emissions.clone(),
            unit: identity.unit.clone(),
            emissions,
            values,
            input_values,
        })
    }

    /// Check the positivity and identity constraints.
    ///
    /// `tolerance` is the relative tolerance for the identity check.
    pub fn validate(&self, tolerance: FloatValue) -> KayaResult<()> {
        for (s, sector) in self.sectors.iter().enumerate() {
            for (t, year) in self.years.iter().enumerate() {
                let emissions = self.emissions[[s, t]];
                if emissions.is_nan() {
                    return Err(self.invalid(s, t, &self.emissions_variable, "value is missing"));
                }
                if !emissions.is_finite() || emissions < 0.0 {
                    return Err(self.invalid(
                        s,
                        t,
                        &self.emissions_variable,
                        &format!("emissions must be finite and non-negative, got {}", emissions),
                    ));
                }
                if emissions == 0.0 {
                    self.validate_zero_emission_year(s, t)?;
                    continue;
                }

                for (k, driver) in self.drivers.iter().enumerate() {
                    let value = self.values[[s, t, k]];
                    if value.is_nan() {
                        return Err(self.invalid(
                            s,
                            t,
                            driver,
                            &format!("driver {} is missing or undefined", self.formulas[k]),
                        ));
                    }
                    if !value.is_finite() || value <= 0.0 {
                        return Err(self.invalid(
                            s,
                            t,
                            driver,
                            &format!(
                                "driver {} must be finite and strictly positive, got {}",
                                self.formulas[k], value
                            ),
                        ));
                    }
                }

                let product: FloatValue = self.values.slice(s![s, t, ..]).product();
                if !is_close!(product, emissions, rel_tol = tolerance) {
                    return Err(KayaError::IdentityMismatch {
                        sector: sector.clone(),
                        year: *year,
                        emissions,
                        product,
                    });
                }
            }
        }
        Ok(())
    }

    /// Zero drivers and `0/0` ratios are what zero emissions force. Missing or
    /// negative inputs and `x/0` ratios with `x > 0` are not.
    fn validate_zero_emission_year(&self, s: usize, t: usize) -> KayaResult<()> {
        for (v, variable) in self.inputs.iter().enumerate() {
            let value = self.input_values[[s, t, v]];
            if value.is_nan() {
                return Err(self.invalid(s, t, variable, "value is missing"));
            }
            if !value.is_finite() || value < 0.0 {
                return Err(self.invalid(
                    s,
                    t,
                    variable,
                    &format!("value must be finite and non-negative, got {}", value),
                ));
            }
        }
        for (k, driver) in self.drivers.iter().enumerate() {
            if self.values[[s, t, k]].is_infinite() {
                return Err(self.invalid(
                    s,
                    t,
                    driver,
                    &format!("driver {} divides a positive value by zero", self.formulas[k]),
                ));
            }
        }
        Ok(())
    }

    fn invalid(&self, s: usize, t: usize, variable: &str, reason: &str) -> KayaError {
        KayaError::DataValidation {
            sector: self.sectors[s].clone(),
            year: self.years[t],
            variable: variable.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn sectors(&self) -> &[String] {
        &self.sectors
    }

    pub fn years(&self) -> &[Year] {
        &self.years
    }

    pub fn drivers(&self) -> &[String] {
        &self.drivers
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Emission levels, sector x year
    pub fn emissions(&self) -> ArrayView2<'_, FloatValue> {
        self.emissions.view()
    }

    /// Driver levels, sector x year x driver
    pub fn values(&self) -> ArrayView3<'_, FloatValue> {
        self.values.view()
    }

    /// Product of the drivers for every sector-year
    pub fn reconstruct(&self) -> Array2<FloatValue> {
        self.values.map_axis(Axis(2), |drivers| drivers.product())
    }
}

fn select_years(values: &ArrayView2<'_, FloatValue>, year_indices: &[usize]) -> Array2<FloatValue> {
    values.select(Axis(1), year_indices)
}
