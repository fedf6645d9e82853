//! Local validation engine tests.
//!
//! End-to-end scenarios over raw rows, checked against the JSON contract.

use crate::mocks::{single_sheet, spot_row, MockLotAuthority};
use serde_json::json;
use spot_validator::data::{RawRow, Sheet};
use spot_validator::engine::result::{ErrorCategory, ErrorEntry};
use spot_validator::services::StaticLotAuthority;
use spot_validator::ValidationEngine;

#[test]
fn test_duplicate_coordinates_point_to_first_row() {
    let sheets = single_sheet(vec![
        spot_row("7.3365", "-76.7232", "1", "1", "L1"),
        spot_row("7.3365", "-76.7232", "1", "2", "L1"),
    ]);
    let result = ValidationEngine::new().validate(&sheets, None, None);

    assert!(!result.ok);
    let entries = result.entries(ErrorCategory::DuplicateCoordinates);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].row(), Some(3));
    assert_eq!(entries[0].duplicate_of_row(), Some(2));
    assert!(result.entries(ErrorCategory::DuplicateLineInLot).is_empty());
}

#[test]
fn test_missing_lote_column_is_exact_result() {
    let rows: Vec<RawRow> = (0..25)
        .map(|i| {
            RawRow::from_pairs([
                ("latitud", format!("7.{}", i)),
                ("longitud", "-76.1".to_string()),
                ("linea", "1".to_string()),
                ("posicion", i.to_string()),
            ])
        })
        .collect();
    let result = ValidationEngine::new().validate(&single_sheet(rows), None, None);
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["errors"], json!({"columnas_faltantes": ["lote"]}));
    assert_eq!(value["ok"], json!(false));
}

#[test]
fn test_three_way_duplicates_never_chain() {
    let sheets = single_sheet(vec![
        spot_row("7.1", "-76.1", "1", "1", "L1"),
        spot_row("7.2", "-76.2", "1", "2", "L1"),
        spot_row("7.1", "-76.1", "1", "3", "L1"),
        spot_row("7.3", "-76.3", "1", "4", "L1"),
        spot_row("7.1", "-76.1", "1", "5", "L1"),
    ]);
    let result = ValidationEngine::new().validate(&sheets, None, None);
    let pairs: Vec<(Option<usize>, Option<usize>)> = result
        .entries(ErrorCategory::DuplicateCoordinates)
        .iter()
        .map(|e| (e.row(), e.duplicate_of_row()))
        .collect();
    assert_eq!(pairs, vec![(Some(4), Some(2)), (Some(6), Some(2))]);
    // The owner row is never reported.
    assert!(result.categories_for_row(2).is_empty());
}

#[test]
fn test_zero_position_is_present_whitespace_is_not() {
    let sheets = single_sheet(vec![
        spot_row("7.1", "-76.1", "1", "0", "L1"),
        spot_row("7.2", "-76.2", "1", "   ", "L1"),
    ]);
    let result = ValidationEngine::new().validate(&sheets, None, None);
    let empty = result.entries(ErrorCategory::EmptyValues);
    assert_eq!(empty.len(), 1);
    assert_eq!(
        empty[0],
        ErrorEntry::EmptyValue {
            row: 3,
            column: "posicion".into()
        }
    );
}

#[test]
fn test_lot_authority_membership() {
    let sheets = single_sheet(vec![
        spot_row("7.1", "-76.1", "1", "1", "Norte"),
        spot_row("7.2", "-76.2", "1", "1", "Sur"),
        spot_row("7.3", "-76.3", "1", "1", "Este"),
    ]);
    let authority = MockLotAuthority::with_lots(&["Norte", "Sur"]);
    let calls = authority.calls();
    let result = ValidationEngine::new().validate(&sheets, Some("finca-7"), Some(&authority));

    let invalid = result.entries(ErrorCategory::InvalidLot);
    assert_eq!(invalid.len(), 1);
    assert_eq!(
        invalid[0],
        ErrorEntry::InvalidLot {
            row: 4,
            lote: "Este".into()
        }
    );
    assert_eq!(*calls.lock().unwrap(), vec!["finca-7".to_string()]);
}

#[test]
fn test_unavailable_authority_disables_lot_check() {
    let sheets = single_sheet(vec![spot_row("7.1", "-76.1", "1", "1", "Este")]);
    let authority = MockLotAuthority::unavailable("timeout");
    let result = ValidationEngine::new().validate(&sheets, Some("finca-7"), Some(&authority));
    assert!(result.ok);
}

#[test]
fn test_no_farm_id_skips_lookup() {
    let sheets = single_sheet(vec![spot_row("7.1", "-76.1", "1", "1", "Este")]);
    let authority = MockLotAuthority::with_lots(&["Norte"]);
    let calls = authority.calls();
    let result = ValidationEngine::new().validate(&sheets, None, Some(&authority));
    assert!(result.ok);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_rows_numbered_across_sheets() {
    let sheets = vec![
        Sheet::new("Hoja1", vec![spot_row("7.1", "-76.1", "1", "1", "L1")]),
        Sheet::new("Hoja2", vec![spot_row("7.1", "-76.1", "2", "1", "L1")]),
    ];
    let result = ValidationEngine::new().validate(&sheets, None, None);
    assert_eq!(result.meta.sheets, 2);
    assert_eq!(result.meta.rows_total, 2);
    assert_eq!(result.entries(ErrorCategory::DuplicateCoordinates)[0].row(), Some(3));
}

#[test]
fn test_repeated_position_reports_both_categories() {
    let sheets = single_sheet(vec![
        spot_row("7.1", "-76.1", "4", "9", "L1"),
        spot_row("7.2", "-76.2", "4", "9", "L1"),
    ]);
    let result = ValidationEngine::new().validate(&sheets, None, None);
    assert_eq!(
        result.categories_for_row(3),
        vec![ErrorCategory::DuplicateLineInLot, ErrorCategory::DuplicatePositionInLine]
    );
}

#[test]
fn test_ok_iff_no_categories() {
    let engine = ValidationEngine::new();
    let authority = StaticLotAuthority::new(["L1"]);
    let cases = vec![
        vec![spot_row("7.1", "-76.1", "1", "1", "L1")],
        vec![spot_row("90", "180", "1", "1", "L1")],
        vec![spot_row("90.5", "-76.1", "1", "1", "L1")],
        vec![spot_row("7.1", "-76.1", "1", "1", "L2")],
        vec![spot_row("7.1", "-76.1", "", "1", "L1")],
    ];
    for rows in cases {
        let result = engine.validate(&single_sheet(rows), Some("f"), Some(&authority));
        assert_eq!(result.ok, result.errors.is_empty());
        assert!(result.errors.values().all(|entries| !entries.is_empty()));
    }
}
