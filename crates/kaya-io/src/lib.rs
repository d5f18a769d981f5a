//! Loading and writing boundary for `kaya-core`.
//!
//! The core never touches files or column names. This crate turns a
//! long-format CSV into a validated [`Panel`](kaya_core::Panel) using an
//! explicit [`PanelSchema`], and writes decomposition results as CSV tables
//! for downstream plotting.

pub mod errors;
pub mod reader;
pub mod schema;
pub mod writer;

pub use errors::{IoError, IoResult};
pub use reader::{read_panel, read_panel_file};
pub use schema::PanelSchema;
pub use writer::{
    write_contributions, write_multiplicative, write_national_series, write_sector_totals,
};
