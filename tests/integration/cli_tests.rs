//! CLI integration tests.
//!
//! Tests for argument parsing and command handling.

use clap::Parser;
use spot_validator::checks::check_catalog;
use spot_validator::cli::args::{Args, Command, OutputFormat, OutputOptions};
use spot_validator::cli::output::get_formatter;
use spot_validator::commands;
use spot_validator::engine::result::ValidationOutcome;
use spot_validator::{SpotCheckConfig, ValidationEngine};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::mocks::{single_sheet, spot_row, DUPLICATE_COORDS_SHEET, NO_LOTE_SHEET};

fn parse(args: &[&str]) -> Args {
    Args::try_parse_from(args).unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_validate_command_local_json() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "spots.csv", DUPLICATE_COORDS_SHEET);
    let args = parse(&[
        "spot-validator",
        "--format",
        "json",
        "validate",
        file.to_str().unwrap(),
        "--local",
    ]);
    let Command::Validate(ref validate) = args.command else {
        panic!("expected validate");
    };
    let output = commands::validate::run(validate, &args.output_options(), &SpotCheckConfig::default()).unwrap();
    assert!(output.has_errors);

    let value: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(value["validator_used"], "local");
    assert_eq!(value["errors"]["coords_duplicadas"][0]["duplicate_of_row"], 2);
    assert!(value["errors"].get("linea_duplicada_en_lote").is_none());
}

#[test]
fn test_correct_command_refuses_missing_lote() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "spots.csv", NO_LOTE_SHEET);
    let args = parse(&["spot-validator", "correct", file.to_str().unwrap(), "--local"]);
    let Command::Correct(ref correct) = args.command else {
        panic!("expected correct");
    };
    let err = commands::correct::run(correct, &args.output_options(), &SpotCheckConfig::default()).unwrap_err();
    assert!(err.to_string().contains("lote"));
    assert!(!dir.path().join("spots_corregido.csv").exists());
}

#[test]
fn test_stats_command_json() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "spots.csv", DUPLICATE_COORDS_SHEET);
    let args = parse(&["spot-validator", "stats", file.to_str().unwrap(), "--format", "json"]);
    let Command::Stats(ref stats) = args.command else {
        panic!("expected stats");
    };
    let output = commands::stats::run(stats, &args.output_options()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(value["total_spots"], 2);
    assert_eq!(value["lotes"], serde_json::json!(["L1"]));
}

#[test]
fn test_config_file_lines_section_applies() {
    let dir = TempDir::new().unwrap();
    let config_path = write(&dir, "spot-validator.toml", "[lines]\nmax_groups = 1\n");
    let sheet = write(
        &dir,
        "spots.csv",
        "latitud,longitud,linea,posicion,lote\n7.1,-76.1,1,1,L1\n7.1,-76.2,2,1,L1\n",
    );
    let args = parse(&[
        "spot-validator",
        "lines",
        sheet.to_str().unwrap(),
        "--config",
        config_path.to_str().unwrap(),
    ]);
    let config = SpotCheckConfig::from_file(args.config.as_deref().unwrap()).unwrap();
    let Command::Lines(ref lines) = args.command else {
        panic!("expected lines");
    };
    let output = commands::lines::run(lines, &args.output_options(), &config).unwrap();
    assert!(output.text.contains("Groups: 1/2"));
}

#[test]
fn test_formatters_for_every_format() {
    let sheets = single_sheet(vec![spot_row("95", "-76.1", "1", "1", "L1")]);
    let outcome = ValidationOutcome::local(ValidationEngine::new().validate(&sheets, None, None));

    let text = get_formatter(&OutputFormat::Text, true, false, false).format(&outcome);
    assert!(text.contains("rango_coord"));
    assert!(text.contains("row 2: latitud = 95 out of range"));

    let json = get_formatter(&OutputFormat::Json, true, false, false).format(&outcome);
    assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());

    let junit = get_formatter(&OutputFormat::Junit, true, false, false).format(&outcome);
    assert!(junit.contains("<failure message=\"Coordinate out of range: 1 entries\">"));
}

#[test]
fn test_default_output_options() {
    let options = OutputOptions::default();
    assert_eq!(options.format, OutputFormat::Text);
    assert!(!options.verbose);
}

#[test]
fn test_catalog_ids_are_unique_and_ordered() {
    let ids: Vec<&str> = check_catalog().iter().map(|c| c.id).collect();
    assert_eq!(
        ids,
        vec!["SPT-001", "SPT-002", "SPT-003", "SPT-004", "SPT-005", "SPT-006", "SPT-007"]
    );
}
