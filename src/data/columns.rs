//! Header normalization.
//!
//! Single source of truth for header synonyms. Matching is case-insensitive
//! and ignores surrounding whitespace; headers that match nothing keep their
//! lower-cased trimmed spelling.

use super::rows::{CanonicalField, NormalizedRow, RawRow, Sheet, FIRST_DATA_ROW};

/// Synonym table, checked in this order.
const SYNONYMS: [(CanonicalField, &[&str]); 5] = [
    (CanonicalField::Latitud, &["latitud", "lat", "latitude"]),
    (
        CanonicalField::Longitud,
        &["longitud", "lon", "lng", "long", "longitude"],
    ),
    (
        CanonicalField::Linea,
        &["linea", "línea", "line", "linea_palma"],
    ),
    (
        CanonicalField::Posicion,
        &[
            "posicion",
            "posición",
            "position",
            "posicion_palma",
            "palma",
            "palma_num",
        ],
    ),
    (CanonicalField::Lote, &["lote", "lot"]),
];

/// Maps arbitrary header spellings onto the canonical field names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnNormalizer;

impl ColumnNormalizer {
    pub fn new() -> Self {
        ColumnNormalizer
    }

    /// Lower-cased, trimmed header.
    pub fn clean_header(header: &str) -> String {
        header.trim().to_lowercase()
    }

    /// Canonical field a header maps to, if any.
    pub fn canonical_field(header: &str) -> Option<CanonicalField> {
        let key = Self::clean_header(header);
        SYNONYMS
            .iter()
            .find(|(_, names)| names.contains(&key.as_str()))
            .map(|(field, _)| *field)
    }

    /// Normalized column name for a header.
    pub fn normalize_header(header: &str) -> String {
        match Self::canonical_field(header) {
            Some(field) => field.as_str().to_string(),
            None => Self::clean_header(header),
        }
    }

    /// Normalize one row. When two headers map to the same name the later
    /// value wins but the column keeps its first position.
    pub fn normalize_row(&self, row: &RawRow, row_number: usize) -> NormalizedRow {
        let mut normalized = NormalizedRow {
            row_number,
            ..Default::default()
        };

        for (header, value) in row.cells() {
            let name = match Self::canonical_field(header) {
                Some(field) => {
                    *normalized.slot_mut(field) = Some(value.clone());
                    field.as_str().to_string()
                }
                None => {
                    let key = Self::clean_header(header);
                    match normalized.extras.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value.clone(),
                        None => normalized.extras.push((key.clone(), value.clone())),
                    }
                    key
                }
            };
            if !normalized.columns.contains(&name) {
                normalized.columns.push(name);
            }
        }

        normalized
    }

    /// Normalize rows; the first row is numbered 2.
    pub fn normalize(&self, rows: &[RawRow]) -> Vec<NormalizedRow> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| self.normalize_row(row, index + FIRST_DATA_ROW))
            .collect()
    }

    /// Normalize all sheets as one flattened sequence.
    pub fn normalize_sheets(&self, sheets: &[Sheet]) -> Vec<NormalizedRow> {
        let mut out = Vec::new();
        for row in sheets.iter().flat_map(|s| s.rows.iter()) {
            let row_number = out.len() + FIRST_DATA_ROW;
            out.push(self.normalize_row(row, row_number));
        }
        out
    }
}
