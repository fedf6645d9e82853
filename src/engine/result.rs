//! Validation result model.
//!
//! [`ValidationResult`] is the stable JSON contract shared by the local
//! engine and the remote validator:
//! `{meta:{rows_total, sheets}, columns_detected, errors:{category:[...]}, ok}`.
//! [`ValidationOutcome`] wraps it with which backend produced it.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Error categories, ordered as they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorCategory {
    #[serde(rename = "coords_duplicadas")]
    DuplicateCoordinates,
    #[serde(rename = "linea_duplicada_en_lote")]
    DuplicateLineInLot,
    #[serde(rename = "posicion_duplicada_en_linea")]
    DuplicatePositionInLine,
    #[serde(rename = "lote_invalido")]
    InvalidLot,
    #[serde(rename = "rango_coord")]
    CoordinateRange,
    #[serde(rename = "columnas_faltantes")]
    MissingColumns,
    #[serde(rename = "valores_vacios")]
    EmptyValues,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 7] = [
        ErrorCategory::DuplicateCoordinates,
        ErrorCategory::DuplicateLineInLot,
        ErrorCategory::DuplicatePositionInLine,
        ErrorCategory::InvalidLot,
        ErrorCategory::CoordinateRange,
        ErrorCategory::MissingColumns,
        ErrorCategory::EmptyValues,
    ];

    /// Wire name used in JSON and in the `Errores` export column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::DuplicateCoordinates => "coords_duplicadas",
            ErrorCategory::DuplicateLineInLot => "linea_duplicada_en_lote",
            ErrorCategory::DuplicatePositionInLine => "posicion_duplicada_en_linea",
            ErrorCategory::InvalidLot => "lote_invalido",
            ErrorCategory::CoordinateRange => "rango_coord",
            ErrorCategory::MissingColumns => "columnas_faltantes",
            ErrorCategory::EmptyValues => "valores_vacios",
        }
    }

    /// Human-readable label for terminal output.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::DuplicateCoordinates => "Duplicate coordinates",
            ErrorCategory::DuplicateLineInLot => "Duplicate line/position in lot",
            ErrorCategory::DuplicatePositionInLine => "Duplicate position in line",
            ErrorCategory::InvalidLot => "Unknown lot",
            ErrorCategory::CoordinateRange => "Coordinate out of range",
            ErrorCategory::MissingColumns => "Missing required columns",
            ErrorCategory::EmptyValues => "Empty required values",
        }
    }

    /// Rows flagged with this category are always removed from correction
    /// exports. Empty values are removed only on request.
    pub fn always_removes_row(&self) -> bool {
        !matches!(self, ErrorCategory::EmptyValues)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cell value echoed back in an error entry. The remote validator sends
/// numbers where the local engine may only have text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

/// One reported problem. The JSON shape depends on the category; variant
/// order matters for untagged decoding (most fields first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorEntry {
    /// `linea_duplicada_en_lote` and `posicion_duplicada_en_linea`.
    LineConflict {
        lote: String,
        linea: String,
        posicion: Option<CellValue>,
        row: usize,
        duplicate_of_row: usize,
    },
    DuplicateCoordinates {
        row: usize,
        duplicate_of_row: usize,
        lat: CellValue,
        lon: CellValue,
    },
    OutOfRange {
        row: usize,
        field: String,
        value: f64,
    },
    EmptyValue {
        row: usize,
        column: String,
    },
    InvalidLot {
        row: usize,
        lote: String,
    },
    /// `columnas_faltantes` entries are bare column names.
    MissingColumn(String),
}

impl ErrorEntry {
    /// Originating row, if the entry refers to one.
    pub fn row(&self) -> Option<usize> {
        match self {
            ErrorEntry::LineConflict { row, .. }
            | ErrorEntry::DuplicateCoordinates { row, .. }
            | ErrorEntry::OutOfRange { row, .. }
            | ErrorEntry::EmptyValue { row, .. }
            | ErrorEntry::InvalidLot { row, .. } => Some(*row),
            ErrorEntry::MissingColumn(_) => None,
        }
    }

    /// Earliest row sharing the offending key, for duplicate entries.
    pub fn duplicate_of_row(&self) -> Option<usize> {
        match self {
            ErrorEntry::LineConflict {
                duplicate_of_row, ..
            }
            | ErrorEntry::DuplicateCoordinates {
                duplicate_of_row, ..
            } => Some(*duplicate_of_row),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorEntry::LineConflict {
                lote,
                linea,
                posicion,
                row,
                duplicate_of_row,
            } => {
                let pos = posicion
                    .as_ref()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string());
                write!(
                    f,
                    "row {}: lote {} linea {} posicion {} repeats row {}",
                    row, lote, linea, pos, duplicate_of_row
                )
            }
            ErrorEntry::DuplicateCoordinates {
                row,
                duplicate_of_row,
                lat,
                lon,
            } => write!(
                f,
                "row {}: ({}, {}) repeats row {}",
                row, lat, lon, duplicate_of_row
            ),
            ErrorEntry::OutOfRange { row, field, value } => {
                write!(f, "row {}: {} = {} out of range", row, field, value)
            }
            ErrorEntry::EmptyValue { row, column } => write!(f, "row {}: {} is empty", row, column),
            ErrorEntry::InvalidLot { row, lote } => write!(f, "row {}: lote '{}' not registered", row, lote),
            ErrorEntry::MissingColumn(name) => write!(f, "column '{}' not found", name),
        }
    }
}

/// Input metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMeta {
    pub rows_total: usize,
    pub sheets: usize,
}

pub type ErrorMap = BTreeMap<ErrorCategory, Vec<ErrorEntry>>;

/// Outcome of validating one upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub meta: ResultMeta,
    #[serde(default)]
    pub columns_detected: Vec<String>,
    #[serde(default, deserialize_with = "nullable_errors")]
    pub errors: ErrorMap,
    pub ok: bool,
}

fn nullable_errors<'de, D>(deserializer: D) -> Result<ErrorMap, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ErrorMap>::deserialize(deserializer)?.unwrap_or_default())
}

impl ValidationResult {
    /// Build a result, dropping empty categories and deriving `ok`.
    pub fn new(meta: ResultMeta, columns_detected: Vec<String>, mut errors: ErrorMap) -> Self {
        errors.retain(|_, entries| !entries.is_empty());
        let ok = errors.is_empty();
        ValidationResult {
            meta,
            columns_detected,
            errors,
            ok,
        }
    }

    /// Result for an upload whose schema lacks required columns.
    pub fn missing_columns(meta: ResultMeta, columns_detected: Vec<String>, missing: Vec<String>) -> Self {
        let mut errors = ErrorMap::new();
        errors.insert(
            ErrorCategory::MissingColumns,
            missing.into_iter().map(ErrorEntry::MissingColumn).collect(),
        );
        Self::new(meta, columns_detected, errors)
    }

    pub fn entries(&self, category: ErrorCategory) -> &[ErrorEntry] {
        self.errors.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names listed under `columnas_faltantes`.
    pub fn missing_column_names(&self) -> Vec<String> {
        self.entries(ErrorCategory::MissingColumns)
            .iter()
            .filter_map(|e| match e {
                ErrorEntry::MissingColumn(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has_schema_errors(&self) -> bool {
        !self.entries(ErrorCategory::MissingColumns).is_empty()
    }

    /// Distinct categories referencing `row`, in category order.
    pub fn categories_for_row(&self, row: usize) -> Vec<ErrorCategory> {
        self.errors
            .iter()
            .filter(|(_, entries)| entries.iter().any(|e| e.row() == Some(row)))
            .map(|(category, _)| *category)
            .collect()
    }

    /// Index of row number -> categories referencing it.
    pub fn row_index(&self) -> BTreeMap<usize, BTreeSet<ErrorCategory>> {
        let mut index: BTreeMap<usize, BTreeSet<ErrorCategory>> = BTreeMap::new();
        for (category, entries) in &self.errors {
            for row in entries.iter().filter_map(ErrorEntry::row) {
                index.entry(row).or_default().insert(*category);
            }
        }
        index
    }

    pub fn summary(&self) -> ResultSummary {
        let by_category = self
            .errors
            .iter()
            .map(|(category, entries)| (*category, entries.len()))
            .collect::<Vec<_>>();
        ResultSummary {
            rows_total: self.meta.rows_total,
            rows_flagged: self.row_index().len(),
            total_entries: by_category.iter().map(|(_, n)| n).sum(),
            by_category,
        }
    }
}

/// Result summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSummary {
    pub rows_total: usize,
    pub rows_flagged: usize,
    pub total_entries: usize,
    pub by_category: Vec<(ErrorCategory, usize)>,
}

/// Accumulates entries per category during a validation pass.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    errors: ErrorMap,
}

impl ResultAggregator {
    pub fn new() -> Self {
        ResultAggregator::default()
    }

    pub fn add(&mut self, category: ErrorCategory, entry: ErrorEntry) {
        self.errors.entry(category).or_default().push(entry);
    }

    pub fn extend(&mut self, category: ErrorCategory, entries: Vec<ErrorEntry>) {
        if entries.is_empty() {
            return;
        }
        self.errors.entry(category).or_default().extend(entries);
    }

    pub fn has_errors(&self) -> bool {
        self.errors.values().any(|e| !e.is_empty())
    }

    pub fn into_result(self, meta: ResultMeta, columns_detected: Vec<String>) -> ValidationResult {
        ValidationResult::new(meta, columns_detected, self.errors)
    }
}

/// Which validator produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Remote,
    Local,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Remote => write!(f, "remote"),
            Backend::Local => write!(f, "local"),
        }
    }
}

/// A validation result tagged with its backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    #[serde(flatten)]
    pub result: ValidationResult,
    #[serde(rename = "validator_used")]
    pub backend: Backend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(skip)]
    pub source: String,
    #[serde(skip)]
    pub duration_ms: u64,
}

impl ValidationOutcome {
    pub fn local(result: ValidationResult) -> Self {
        ValidationOutcome {
            result,
            backend: Backend::Local,
            fallback_reason: None,
            source: String::new(),
            duration_ms: 0,
        }
    }
}
