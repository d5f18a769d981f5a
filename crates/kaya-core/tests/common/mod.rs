//! Synthetic Norwegian-style sector panel shared by the integration tests.

use kaya_core::identity::{EMISSIONS, FOSSIL_ENERGY, SECTOR_GDP, TOTAL_ENERGY, TOTAL_GDP};
use kaya_core::{Panel, PanelRow, Year};

pub const FIRST_YEAR: Year = 1990;
pub const LAST_YEAR: Year = 2019;

/// (sector, GDP share, energy intensity GWh/GDP, fossil share, Mt CO2e per fossil GWh)
const SECTORS: [(&str, f64, f64, f64, f64); 5] = [
    ("Manufacturing", 0.12, 40.0, 0.35, 2.6e-4),
    ("Petroleum", 0.20, 12.0, 0.90, 3.1e-4),
    ("Transport", 0.05, 60.0, 0.95, 2.7e-4),
    ("Agriculture", 0.02, 25.0, 0.40, 9.0e-4),
    ("Buildings", 0.30, 8.0, 0.10, 2.2e-4),
];

/// Raw rows for one sector-year, derived so the Kaya identity holds exactly.
pub fn raw_rows(
    sector: &str,
    year: Year,
    total_gdp: f64,
    sector_gdp: f64,
    energy: f64,
    fossil: f64,
    emissions: f64,
) -> Vec<PanelRow> {
    vec![
        PanelRow::new(sector, year, TOTAL_GDP, total_gdp),
        PanelRow::new(sector, year, SECTOR_GDP, sector_gdp),
        PanelRow::new(sector, year, TOTAL_ENERGY, energy),
        PanelRow::new(sector, year, FOSSIL_ENERGY, fossil),
        PanelRow::new(sector, year, EMISSIONS, emissions),
    ]
}

/// 1990-2019 panel with growth, cycles and structural drift in every sector.
pub fn norwegian_rows() -> Vec<PanelRow> {
    let mut rows = Vec::new();
    for year in FIRST_YEAR..=LAST_YEAR {
        let t = (year - FIRST_YEAR) as f64;
        let total_gdp = 1_500.0 * 1.024_f64.powf(t) * (1.0 + 0.015 * (t / 3.0).sin());
        for (i, (sector, share, intensity, fossil_share, carbon)) in SECTORS.iter().enumerate() {
            let phase = i as f64;
            let sector_gdp = total_gdp * share * (1.0 + 0.1 * ((t + phase) / 7.0).sin());
            let energy = sector_gdp * intensity * 0.985_f64.powf(t);
            let fossil = energy * (fossil_share * (1.0 - 0.004 * t)).max(0.01);
            let emissions = fossil * carbon * (1.0 + 0.02 * ((t * 0.9 + phase) / 2.0).cos());
            rows.extend(raw_rows(
                sector,
                year,
                total_gdp,
                sector_gdp,
                energy,
                fossil,
                emissions,
            ));
        }
    }
    rows
}

pub fn norwegian_panel() -> Panel {
    Panel::from_rows(norwegian_rows()).unwrap()
}
