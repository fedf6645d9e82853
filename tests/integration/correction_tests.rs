//! Correction export tests.

use crate::mocks::{single_sheet, spot_row, upload, MockRemoteValidator};
use spot_validator::correction::{RowStatus, ERRORS_COLUMN, STATUS_COLUMN};
use spot_validator::data::{CsvSheetReader, SheetReader};
use spot_validator::engine::result::ValidationResult;
use spot_validator::engine::ValidatorOrchestrator;
use spot_validator::{CorrectionFileGenerator, SpotError, ValidationEngine};

#[test]
fn test_duplicates_removed_regardless_of_flag() {
    let sheets = single_sheet(vec![
        spot_row("7.1", "-76.1", "1", "1", "L1"),
        spot_row("7.2", "-76.2", "1", "1", "L1"),
        spot_row("7.3", "-76.3", "1", "", "L1"),
        spot_row("7.1", "-76.1", "1", "4", "L1"),
    ]);
    let result = ValidationEngine::new().validate(&sheets, None, None);
    let generator = CorrectionFileGenerator::new();

    let kept = generator.generate_sheets(&sheets, &result, false).unwrap();
    let kept_rows: Vec<usize> = kept.rows.iter().map(|r| r.row_number).collect();
    assert_eq!(kept_rows, vec![2, 4]);
    assert_eq!(kept.rows[1].status, RowStatus::Error);
    assert_eq!(kept.rows[1].errors_cell(), "valores_vacios");

    let removed = generator.generate_sheets(&sheets, &result, true).unwrap();
    let kept_rows: Vec<usize> = removed.rows.iter().map(|r| r.row_number).collect();
    assert_eq!(kept_rows, vec![2]);
    assert_eq!(removed.removed_rows, vec![3, 4, 5]);
}

#[test]
fn test_export_columns_end_with_status_columns() {
    let sheets = single_sheet(vec![spot_row("7.1", "-76.1", "1", "1", "L1")]);
    let result = ValidationEngine::new().validate(&sheets, None, None);
    let export = CorrectionFileGenerator::new()
        .generate_sheets(&sheets, &result, false)
        .unwrap();
    let header = export.header_record();
    assert_eq!(header[header.len() - 2], STATUS_COLUMN);
    assert_eq!(header[header.len() - 1], ERRORS_COLUMN);
    assert_eq!(export.rows[0].status, RowStatus::Ok);
}

#[test]
fn test_embedded_delimiters_quotes_newlines_escaped() {
    let sheets = single_sheet(vec![spot_row("7.1", "-76.1", "1", "1", "Lote \"A\", norte\nbajo")]);
    let result = ValidationEngine::new().validate(&sheets, None, None);
    let export = CorrectionFileGenerator::new()
        .generate_sheets(&sheets, &result, false)
        .unwrap();
    let bytes = export.to_csv().unwrap();

    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(&record[4], "Lote \"A\", norte\nbajo");
    assert_eq!(&record[5], "OK");
}

#[test]
fn test_refusal_is_distinct_error() {
    let sheets = single_sheet(vec![spot_row("7.1", "-76.1", "1", "1", "L1")]);
    let result = ValidationResult::missing_columns(result_meta(), vec![], vec!["lote".into()]);
    let err = CorrectionFileGenerator::new()
        .generate_sheets(&sheets, &result, true)
        .unwrap_err();
    assert!(matches!(err, SpotError::SchemaIncomplete { ref missing } if missing == &["lote"]));
}

#[test]
fn test_remote_result_drives_export() {
    let sheet = "latitud,longitud,linea,posicion,lote\n7.1,-76.1,1,1,L1\n7.2,-76.2,1,2,Este\n";
    let remote_json = r#"{
        "meta": {"rows_total": 2, "sheets": 1},
        "columns_detected": ["latitud", "longitud", "linea", "posicion", "lote"],
        "errors": {"lote_invalido": [{"row": 3, "lote": "Este"}]},
        "ok": false
    }"#;
    let remote_result: ValidationResult = serde_json::from_str(remote_json).unwrap();
    let upload = upload("spots.csv", sheet);

    let outcome = ValidatorOrchestrator::new(Box::new(CsvSheetReader::new()))
        .with_remote(Box::new(MockRemoteValidator::answering(remote_result)))
        .resolve(&upload, Some("12"), None)
        .unwrap();
    let sheets = CsvSheetReader::new().read_sheets(&upload).unwrap();
    let export = CorrectionFileGenerator::new()
        .generate_sheets(&sheets, &outcome.result, true)
        .unwrap();

    assert_eq!(export.rows.len(), 1);
    assert_eq!(export.rows[0].status, RowStatus::Ok);
    assert_eq!(export.removed_rows, vec![3]);
}

#[test]
fn test_annotate_keeps_every_row() {
    let sheets = single_sheet(vec![
        spot_row("7.1", "-76.1", "1", "1", "L1"),
        spot_row("7.1", "-76.1", "1", "2", "L1"),
        spot_row("7.3", "-76.3", "1", "", "L1"),
    ]);
    let result = ValidationEngine::new().validate(&sheets, None, None);
    let export = CorrectionFileGenerator::new().annotate(&sheets, &result).unwrap();
    assert_eq!(export.rows.len(), 3);
    assert!(export.removed_rows.is_empty());
    assert_eq!(export.error_rows(), 2);
}

fn result_meta() -> spot_validator::engine::result::ResultMeta {
    spot_validator::engine::result::ResultMeta {
        rows_total: 1,
        sheets: 1,
    }
}
