//! Correction export.
//!
//! Builds a cleaned copy of an upload from its rows and a previously
//! computed [`ValidationResult`]. Output columns are the normalized headers
//! followed by `Estado` and `Errores`.
//!
//! Row policy:
//! - Flagged by any category other than `valores_vacios`: always dropped
//! - Flagged only by `valores_vacios`: dropped when removing empty values,
//!   otherwise kept with `Estado = ERROR`
//! - Not flagged: kept, `Estado = OK`
//!
//! A result carrying `columnas_faltantes` is refused with
//! [`SpotError::SchemaIncomplete`].

use crate::data::{ColumnNormalizer, NormalizedRow, RawRow, Sheet};
use crate::engine::result::{ErrorCategory, ValidationResult};
use crate::SpotError;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::info;

pub const STATUS_COLUMN: &str = "Estado";
pub const ERRORS_COLUMN: &str = "Errores";

/// Name of the export for an upload, `<stem>_corregido.csv`.
pub fn corrected_file_name(stem: &str) -> String {
    format!("{}_corregido.csv", stem)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Ok,
    Error,
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Ok => write!(f, "OK"),
            RowStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// One kept row of the export.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionRow {
    pub row_number: usize,
    /// Cell values aligned with [`CorrectionExport::headers`] (without the
    /// two status columns).
    pub values: Vec<String>,
    pub status: RowStatus,
    /// Distinct categories referencing the row, in category order.
    pub errors: Vec<ErrorCategory>,
}

impl CorrectionRow {
    /// The `Errores` cell.
    pub fn errors_cell(&self) -> String {
        self.errors
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionExport {
    /// Normalized data headers, in first-seen order.
    pub headers: Vec<String>,
    pub rows: Vec<CorrectionRow>,
    /// Row numbers left out of the export.
    pub removed_rows: Vec<usize>,
}

impl CorrectionExport {
    /// Full header line including `Estado` and `Errores`.
    pub fn header_record(&self) -> Vec<String> {
        let mut record = self.headers.clone();
        record.push(STATUS_COLUMN.to_string());
        record.push(ERRORS_COLUMN.to_string());
        record
    }

    pub fn error_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.status == RowStatus::Error).count()
    }

    /// Serialize as RFC 4180 CSV.
    pub fn to_csv(&self) -> Result<Vec<u8>, SpotError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(self.header_record())
            .map_err(|e| write_error(e.to_string()))?;
        for row in &self.rows {
            let mut record = row.values.clone();
            record.push(row.status.to_string());
            record.push(row.errors_cell());
            writer.write_record(&record).map_err(|e| write_error(e.to_string()))?;
        }
        writer.into_inner().map_err(|e| write_error(e.to_string()))
    }

    pub fn write_to(&self, path: &Path) -> Result<(), SpotError> {
        let bytes = self.to_csv()?;
        std::fs::write(path, bytes).map_err(|e| SpotError::Io {
            context: format!("writing {}", path.display()),
            message: e.to_string(),
        })
    }
}

fn write_error(message: String) -> SpotError {
    SpotError::Io {
        context: "writing correction csv".to_string(),
        message,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CorrectionFileGenerator {
    normalizer: ColumnNormalizer,
}

impl CorrectionFileGenerator {
    pub fn new() -> Self {
        CorrectionFileGenerator::default()
    }

    /// Filter and mark rows. Row numbers start at 2 as in validation.
    pub fn generate(
        &self,
        rows: &[RawRow],
        result: &ValidationResult,
        remove_empty_values: bool,
    ) -> Result<CorrectionExport, SpotError> {
        self.build(&self.normalizer.normalize(rows), result, Some(remove_empty_values))
    }

    /// [`generate`](Self::generate) over all sheets, numbered as one sequence.
    pub fn generate_sheets(
        &self,
        sheets: &[Sheet],
        result: &ValidationResult,
        remove_empty_values: bool,
    ) -> Result<CorrectionExport, SpotError> {
        self.build(&self.normalizer.normalize_sheets(sheets), result, Some(remove_empty_values))
    }

    /// Keep every row and only fill in `Estado` and `Errores`.
    pub fn annotate(&self, sheets: &[Sheet], result: &ValidationResult) -> Result<CorrectionExport, SpotError> {
        self.build(&self.normalizer.normalize_sheets(sheets), result, None)
    }

    /// `remove_empty_values = None` means mark-only.
    fn build(
        &self,
        rows: &[NormalizedRow],
        result: &ValidationResult,
        remove_empty_values: Option<bool>,
    ) -> Result<CorrectionExport, SpotError> {
        if result.has_schema_errors() {
            return Err(SpotError::SchemaIncomplete {
                missing: result.missing_column_names(),
            });
        }

        let mut headers: Vec<String> = Vec::new();
        for row in rows {
            for column in &row.columns {
                if !headers.contains(column) {
                    headers.push(column.clone());
                }
            }
        }

        let index = result.row_index();
        let empty = BTreeSet::new();
        let mut export = CorrectionExport {
            headers,
            ..Default::default()
        };

        for row in rows {
            let categories = index.get(&row.row_number).unwrap_or(&empty);
            let drop = match remove_empty_values {
                None => false,
                Some(remove_empty) => {
                    categories.iter().any(ErrorCategory::always_removes_row)
                        || (remove_empty && categories.contains(&ErrorCategory::EmptyValues))
                }
            };
            if drop {
                export.removed_rows.push(row.row_number);
                continue;
            }

            let values = export
                .headers
                .iter()
                .map(|h| row.get(h).unwrap_or_default().to_string())
                .collect();
            export.rows.push(CorrectionRow {
                row_number: row.row_number,
                values,
                status: if categories.is_empty() {
                    RowStatus::Ok
                } else {
                    RowStatus::Error
                },
                errors: categories.iter().copied().collect(),
            });
        }

        info!(
            kept = export.rows.len(),
            removed = export.removed_rows.len(),
            marked = export.error_rows(),
            "correction export built"
        );
        Ok(export)
    }
}
