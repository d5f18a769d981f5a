//! Run configuration.
//!
//! Every section is optional in the TOML file. An empty file reproduces the
//! default Norwegian 1990-2019 run:
//!
//! ```toml
//! input = "data/sektor_kaya.csv"
//! output_dir = "output"
//! additivity_tolerance = 1e-6
//!
//! [schema]
//! sector_column = "sector"
//! delimiter = ","
//!
//! [decomposition]
//! base_year = 1990
//! end_year = 2019
//! zero_emission_policy = "limit_value"
//! ```
//!
//! A `[decomposition]` section that omits `base_year` or `end_year` keeps the
//! 1990-2019 window rather than falling back to the panel bounds.

use anyhow::Context;
use kaya_core::{DecompositionOptions, FloatValue, KayaIdentity};
use kaya_io::PanelSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_YEAR: i32 = 1990;
pub const DEFAULT_END_YEAR: i32 = 2019;

/// Settings for one decomposition run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Long-format panel
    ///
    /// Default: data/sektor_kaya.csv
    pub input: PathBuf,

    /// Directory receiving the result tables. Created if needed.
    ///
    /// Default: output
    pub output_dir: PathBuf,

    /// Tolerance for the final additivity audit, relative and in emission units
    ///
    /// Default: 1e-6
    pub additivity_tolerance: FloatValue,

    pub schema: PanelSchema,

    /// Default: the five-factor Norwegian identity
    pub identity: KayaIdentity,

    /// Default: 1990 to 2019, limit-value zero-emission policy
    #[serde(deserialize_with = "decomposition_in_run_window")]
    pub decomposition: DecompositionOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/sektor_kaya.csv"),
            output_dir: PathBuf::from("output"),
            additivity_tolerance: 1e-6,
            schema: PanelSchema::default(),
            identity: KayaIdentity::norwegian(),
            decomposition: DecompositionOptions::default()
                .with_years(DEFAULT_BASE_YEAR, DEFAULT_END_YEAR),
        }
    }
}

fn decomposition_in_run_window<'de, D>(deserializer: D) -> Result<DecompositionOptions, D::Error>
where
    D: Deserializer<'de>,
{
    let mut options = DecompositionOptions::deserialize(deserializer)?;
    options.base_year.get_or_insert(DEFAULT_BASE_YEAR);
    options.end_year.get_or_insert(DEFAULT_END_YEAR);
    Ok(options)
}

impl RunConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid run configuration")?;
        config.identity.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load configuration {}", path.display()))
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string(self)?)
    }
}
