//! Log-Mean Divisia Index decomposition of emissions.
//!
//! Attributes the change in a sector panel's emissions to the drivers of a
//! multiplicative (Kaya-type) identity, for every year-over-year interval and
//! cumulatively. LMDI-I is used because it is exact: driver contributions sum
//! to the emission change with no residual, and they are additive across
//! both sectors and time.
//!
//! # Pipeline
//!
//! 1. [`Panel`]: index long-format `(sector, year, variable, value)` rows
//! 2. [`KayaIdentity`]: declare the ordered drivers and the emissions variable
//! 3. [`decompose`]: derive and validate drivers, weight log changes by the
//!    logarithmic mean of emissions, return a [`DecompositionTable`]
//! 4. Aggregate with [`DecompositionTable::sector_totals`],
//!    [`DecompositionTable::national_series`] or
//!    [`DecompositionTable::cumulative`]
//!
//! # Example
//!
//! ```
//! use kaya_core::{decompose, DecompositionOptions, KayaIdentity, Panel, PanelRow};
//!
//! let identity = KayaIdentity::new("E", "Mt CO2e")
//!     .variable("activity", "gdp")
//!     .ratio("intensity", "E", "gdp");
//!
//! let panel = Panel::from_rows(vec![
//!     PanelRow::new("Industry", 1990, "gdp", 50.0),
//!     PanelRow::new("Industry", 1990, "E", 100.0),
//!     PanelRow::new("Industry", 1991, "gdp", 55.0),
//!     PanelRow::new("Industry", 1991, "E", 110.0),
//! ])
//! .unwrap();
//!
//! let table = decompose(&panel, &identity, &DecompositionOptions::default()).unwrap();
//! let activity = table.contribution("Industry", 1991, "activity").unwrap();
//! assert!((activity - 10.0).abs() < 1e-9);
//! ```

pub mod aggregate;
pub mod decompose;
pub mod drivers;
pub mod errors;
pub mod identity;
pub mod log_mean;
pub mod multiplicative;
pub mod panel;
pub mod table;

pub type FloatValue = f64;
pub type Year = i32;

pub use aggregate::{CumulativeTotals, NationalSeries, SectorTotals};
pub use decompose::{decompose, DecompositionOptions, ZeroEmissionPolicy, ZeroEmissionTransition};
pub use drivers::DriverTable;
pub use errors::{KayaError, KayaResult};
pub use identity::{DriverDefinition, KayaIdentity};
pub use multiplicative::{decompose_multiplicative, MultiplicativeTable};
pub use panel::{Panel, PanelRow};
pub use table::{ContributionRecord, DecompositionTable};
