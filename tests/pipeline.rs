//! End-to-end runs over a generated panel file.

use approx::assert_relative_eq;
use kaya_core::ZeroEmissionPolicy;
use kaya_io::{read_panel_file, PanelSchema};
use kaya_lmdi::pipeline::{CONTRIBUTIONS_FILE, NATIONAL_SERIES_FILE, SECTOR_TOTALS_FILE};
use kaya_lmdi::{run, RunConfig};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const SECTORS: [&str; 3] = ["Industry", "Transport", "Agriculture"];
/// Has no fossil energy, and so no emissions, before 1993
const NEW_SECTOR: &str = "Hydrogen";

/// Norwegian-identity panel for 1990..=1995 in long format.
fn write_panel(path: &Path) {
    let mut csv = String::from("sector,year,variable,value\n");
    for year in 1990..=1995 {
        let t = (year - 1990) as f64;
        let total_gdp = 1000.0 * 1.03_f64.powf(t);
        for (i, sector) in SECTORS.iter().enumerate() {
            let i = i as f64;
            let sector_gdp = total_gdp * (0.2 + 0.05 * i) * (1.0 + 0.01 * t);
            let energy = sector_gdp * (0.5 - 0.01 * t);
            let fossil = energy * (0.6 + 0.1 * i - 0.02 * t);
            let emissions = fossil * 0.002 * (1.0 - 0.005 * t);
            for (variable, value) in [
                ("totGDP", total_gdp),
                ("sec_gdp", sector_gdp),
                ("totGWh", energy),
                ("fossGWh", fossil),
                ("mtCO2e", emissions),
            ] {
                writeln!(csv, "{},{},{},{}", sector, year, variable, value).unwrap();
            }
        }

        let fossil = if year < 1993 { 0.0 } else { 10.0 * (year - 1992) as f64 };
        for (variable, value) in [
            ("totGDP", total_gdp),
            ("sec_gdp", 20.0),
            ("totGWh", 100.0),
            ("fossGWh", fossil),
            ("mtCO2e", fossil * 0.003),
        ] {
            writeln!(csv, "{},{},{},{}", NEW_SECTOR, year, variable, value).unwrap();
        }
    }
    fs::write(path, csv).unwrap();
}

fn config(dir: &Path) -> RunConfig {
    let input = dir.join("panel.csv");
    write_panel(&input);

    let mut config = RunConfig {
        input,
        output_dir: dir.join("output"),
        ..RunConfig::default()
    };
    config.decomposition.base_year = Some(1990);
    config.decomposition.end_year = Some(1995);
    config
}

#[test]
fn test_run_writes_tables() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(&config(dir.path())).unwrap();

    assert_eq!(report.outputs.len(), 4);
    for path in &report.outputs {
        assert!(path.exists(), "{} was not written", path.display());
    }

    let contributions =
        fs::read_to_string(dir.path().join("output").join(CONTRIBUTIONS_FILE)).unwrap();
    let lines: Vec<&str> = contributions.lines().collect();
    assert_eq!(lines[0], "sector,year,driver,contribution,unit");
    // 4 sectors x 5 intervals x 5 drivers
    assert_eq!(lines.len(), 1 + 4 * 5 * 5);
    assert!(lines[1].starts_with("Industry,1991,activity,"));
    assert!(lines[1].ends_with(",Mt CO2e"));
}

#[test]
fn test_national_series_matches_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let report = run(&config).unwrap();

    let panel = read_panel_file(&config.input, &PanelSchema::default()).unwrap();
    let total = |year| -> f64 {
        SECTORS
            .iter()
            .chain([&NEW_SECTOR])
            .map(|s| panel.value(s, year, "mtCO2e").unwrap())
            .sum()
    };

    let cumulative = report.table.cumulative();
    assert_relative_eq!(
        cumulative.delta,
        total(1995) - total(1990),
        max_relative = 1e-10
    );
    assert_relative_eq!(cumulative.values.sum(), cumulative.delta, max_relative = 1e-6);
    assert_relative_eq!(
        report.multiplicative.cumulative_ratio(),
        total(1995) / total(1990),
        max_relative = 1e-10
    );

    let series =
        fs::read_to_string(dir.path().join("output").join(NATIONAL_SERIES_FILE)).unwrap();
    let mut rows = series.lines();
    assert_eq!(
        rows.next(),
        Some("year,activity,structure,efficiency,fossil_share,carbon_efficiency,unattributed,delta_emissions,emissions")
    );
    let explained: f64 = rows
        .map(|row| {
            let fields: Vec<f64> = row.split(',').skip(1).map(|f| f.parse().unwrap()).collect();
            fields[..6].iter().sum::<f64>()
        })
        .sum();
    assert_relative_eq!(explained, cumulative.delta, max_relative = 1e-6);
}

/// Values of column `name` in a written table, keyed by the first field
fn column(path: &Path, name: &str) -> Vec<(String, f64)> {
    let content = fs::read_to_string(path).unwrap();
    let mut lines = content.lines();
    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    let index = header.iter().position(|c| *c == name).unwrap();
    lines
        .map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            (fields[0].to_string(), fields[index].parse().unwrap())
        })
        .collect()
}

#[test]
fn test_zero_emission_policy_from_config() {
    let hydrogen_1993 = 10.0 * 0.003;

    for policy in [ZeroEmissionPolicy::LimitValue, ZeroEmissionPolicy::Exclude] {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.decomposition.zero_emission_policy = policy;
        let report = run(&config).unwrap();

        // 1990-91 and 1991-92 stay at zero, 1992-93 starts emitting
        let transitions = report.table.zero_emission_transitions();
        assert_eq!(transitions.len(), 3);
        assert!(transitions.iter().all(|t| t.sector == NEW_SECTOR && t.policy == policy));

        let output = dir.path().join("output");
        let by_sector = column(&output.join(SECTOR_TOTALS_FILE), "unattributed");
        let by_year = column(&output.join(NATIONAL_SERIES_FILE), "unattributed");
        let expected = match policy {
            ZeroEmissionPolicy::LimitValue => 0.0,
            ZeroEmissionPolicy::Exclude => hydrogen_1993,
        };

        for (sector, value) in &by_sector {
            let expected = if sector == NEW_SECTOR { expected } else { 0.0 };
            assert_relative_eq!(*value, expected, max_relative = 1e-12);
        }
        for (year, value) in &by_year {
            let expected = if year == "1993" { expected } else { 0.0 };
            assert_relative_eq!(*value, expected, max_relative = 1e-12);
        }
        assert_relative_eq!(
            report.table.cumulative().unattributed,
            expected,
            max_relative = 1e-12
        );
    }
}

#[test]
fn test_missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        input: dir.path().join("absent.csv"),
        output_dir: dir.path().join("output"),
        ..RunConfig::default()
    };

    let err = run(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.csv"));
    assert!(!dir.path().join("output").exists());
}

#[test]
fn test_window_outside_panel_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.decomposition.end_year = Some(2019);

    let err = run(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("Decomposition failed"));
}
