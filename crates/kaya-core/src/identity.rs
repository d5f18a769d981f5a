//! Driver identity declarations.
//!
//! An identity declares an emissions variable and an ordered list of drivers
//! whose product reconstructs it for every sector-year. Each driver is either
//! a panel variable used as-is or the ratio of two panel variables.
//!
//! # Example
//!
//! ```
//! use kaya_core::identity::KayaIdentity;
//!
//! let identity = KayaIdentity::new("mtCO2e", "Mt CO2e")
//!     .variable("activity", "totGDP")
//!     .ratio("structure", "sec_gdp", "totGDP")
//!     .ratio("efficiency", "totGWh", "sec_gdp")
//!     .ratio("fossil_share", "fossGWh", "totGWh")
//!     .ratio("carbon_efficiency", "mtCO2e", "fossGWh");
//!
//! assert_eq!(identity, KayaIdentity::norwegian());
//! ```
//!
//! Identities are plain serde structs so they can be declared in a TOML run
//! configuration.

use crate::errors::{KayaError, KayaResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Total national GDP
pub const TOTAL_GDP: &str = "totGDP";
/// Value added by the sector
pub const SECTOR_GDP: &str = "sec_gdp";
/// Total energy use of the sector (GWh)
pub const TOTAL_ENERGY: &str = "totGWh";
/// Fossil energy use of the sector (GWh)
pub const FOSSIL_ENERGY: &str = "fossGWh";
/// Greenhouse-gas emissions of the sector (Mt CO2e)
pub const EMISSIONS: &str = "mtCO2e";

/// One factor of the multiplicative identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverDefinition {
    /// Driver identifier used in result tables (e.g. "structure")
    pub name: String,

    /// Panel variable providing the driver value, or the numerator of a ratio
    pub numerator: String,

    /// Denominator of a ratio driver. `None` uses the numerator directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominator: Option<String>,
}

impl DriverDefinition {
    pub fn variable(name: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            numerator: variable.into(),
            denominator: None,
        }
    }

    pub fn ratio(
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            numerator: numerator.into(),
            denominator: Some(denominator.into()),
        }
    }

    /// Formula label such as `fossGWh/totGWh`
    pub fn formula(&self) -> String {
        match &self.denominator {
            Some(denominator) => format!("{}/{}", self.numerator, denominator),
            None => self.numerator.clone(),
        }
    }
}

/// Ordered multiplicative identity for emissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KayaIdentity {
    /// Panel variable holding emissions
    pub emissions: String,

    /// Unit of the emissions variable, carried into result tables
    pub unit: String,

    /// Drivers in decomposition order
    pub drivers: Vec<DriverDefinition>,
}

impl KayaIdentity {
    /// Start an identity with no drivers
    pub fn new(emissions: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            emissions: emissions.into(),
            unit: unit.into(),
            drivers: Vec::new(),
        }
    }

    /// Append a driver read directly from a panel variable
    pub fn variable(mut self, name: impl Into<String>, variable: impl Into<String>) -> Self {
        self.drivers.push(DriverDefinition::variable(name, variable));
        self
    }

    /// Append a ratio driver
    pub fn ratio(
        mut self,
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        self.drivers
            .push(DriverDefinition::ratio(name, numerator, denominator));
        self
    }

    /// Five-factor identity used for Norwegian sectoral emissions:
    ///
    /// $$ E = GDP \cdot \frac{GDP_i}{GDP} \cdot \frac{En_i}{GDP_i} \cdot \frac{Foss_i}{En_i} \cdot \frac{E_i}{Foss_i} $$
    pub fn norwegian() -> Self {
        Self::new(EMISSIONS, "Mt CO2e")
            .variable("activity", TOTAL_GDP)
            .ratio("structure", SECTOR_GDP, TOTAL_GDP)
            .ratio("efficiency", TOTAL_ENERGY, SECTOR_GDP)
            .ratio("fossil_share", FOSSIL_ENERGY, TOTAL_ENERGY)
            .ratio("carbon_efficiency", EMISSIONS, FOSSIL_ENERGY)
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn driver_names(&self) -> Vec<String> {
        self.drivers.iter().map(|d| d.name.clone()).collect()
    }

    /// Every panel variable the identity reads, emissions first, without repeats
    pub fn required_variables(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        std::iter::once(self.emissions.as_str())
            .chain(self.drivers.iter().flat_map(|d| {
                std::iter::once(d.numerator.as_str()).chain(d.denominator.as_deref())
            }))
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// Check that the identity has at least one driver and unique names
    pub fn validate(&self) -> KayaResult<()> {
        if self.drivers.is_empty() {
            return Err(KayaError::EmptyIdentity);
        }
        let mut names = HashSet::new();
        for driver in &self.drivers {
            if !names.insert(driver.name.as_str()) {
                return Err(KayaError::DuplicateDriver(driver.name.clone()));
            }
        }
        Ok(())
    }
}

impl Default for KayaIdentity {
    fn default() -> Self {
        Self::norwegian()
    }
}
