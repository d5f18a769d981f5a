//! Command-line runner for the sectoral LMDI decomposition.
//!
//! Reads a long-format panel, decomposes emission changes with
//! [`kaya_core::decompose`] and writes the result tables consumed by the
//! plotting scripts. All settings come from a [`RunConfig`], usually loaded
//! from TOML and adjusted by command-line flags.

pub mod config;
pub mod pipeline;

pub use config::RunConfig;
pub use pipeline::{run, RunReport};
