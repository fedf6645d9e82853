//! Row and spot value types.
//!
//! A [`RawRow`] is exactly what the sheet reader produced. A
//! [`NormalizedRow`] is the same row after header normalization: the five
//! canonical fields are lifted into named slots and every other column is kept
//! in a side list. A [`Spot`] is the typed projection used by the geometry
//! code.

use serde::Serialize;
use std::fmt;

/// Row number of the first data row (the header is row 1).
pub const FIRST_DATA_ROW: usize = 2;

/// One physical data row: ordered header -> cell text pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(cells: Vec<(String, String)>) -> Self {
        RawRow { cells }
    }

    /// Build a row from anything that yields header/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RawRow {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A named sequence of rows, as read from one worksheet or CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<RawRow>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Sheet {
            name: name.into(),
            rows,
        }
    }
}

/// The five fields every spot sheet must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalField {
    Latitud,
    Longitud,
    Linea,
    Posicion,
    Lote,
}

impl CanonicalField {
    /// Required columns, in reporting order.
    pub const REQUIRED: [CanonicalField; 5] = [
        CanonicalField::Latitud,
        CanonicalField::Longitud,
        CanonicalField::Linea,
        CanonicalField::Posicion,
        CanonicalField::Lote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Latitud => "latitud",
            CanonicalField::Longitud => "longitud",
            CanonicalField::Linea => "linea",
            CanonicalField::Posicion => "posicion",
            CanonicalField::Lote => "lote",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of reading a typed value out of a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed<T> {
    /// Column missing from the row, or the cell is blank.
    Absent,
    /// Cell has text that does not parse as `T`.
    Invalid,
    Value(T),
}

impl<T> Parsed<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Parsed::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// A row after header normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRow {
    /// 1-based sheet row number (header is row 1).
    pub row_number: usize,
    pub latitud: Option<String>,
    pub longitud: Option<String>,
    pub linea: Option<String>,
    pub posicion: Option<String>,
    pub lote: Option<String>,
    /// Unrecognized columns, keyed by their lower-cased trimmed header.
    pub extras: Vec<(String, String)>,
    /// Normalized column names in the order they first appeared.
    pub columns: Vec<String>,
}

impl NormalizedRow {
    /// Raw cell text of a canonical field, if the column exists in this row.
    pub fn raw(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::Latitud => self.latitud.as_deref(),
            CanonicalField::Longitud => self.longitud.as_deref(),
            CanonicalField::Linea => self.linea.as_deref(),
            CanonicalField::Posicion => self.posicion.as_deref(),
            CanonicalField::Lote => self.lote.as_deref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, field: CanonicalField) -> &mut Option<String> {
        match field {
            CanonicalField::Latitud => &mut self.latitud,
            CanonicalField::Longitud => &mut self.longitud,
            CanonicalField::Linea => &mut self.linea,
            CanonicalField::Posicion => &mut self.posicion,
            CanonicalField::Lote => &mut self.lote,
        }
    }

    /// Trimmed cell text, or `None` when the column is missing or blank.
    ///
    /// `"0"` is present: only blank text counts as empty.
    pub fn present(&self, field: CanonicalField) -> Option<&str> {
        self.raw(field).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Value of any column by normalized name (canonical or extra).
    pub fn get(&self, column: &str) -> Option<&str> {
        let canonical = CanonicalField::REQUIRED
            .iter()
            .find(|f| f.as_str() == column);
        match canonical {
            Some(field) => self.raw(*field),
            None => self
                .extras
                .iter()
                .find(|(k, _)| k == column)
                .map(|(_, v)| v.as_str()),
        }
    }

    pub fn latitude(&self) -> Parsed<f64> {
        parse_number(self.present(CanonicalField::Latitud))
    }

    pub fn longitude(&self) -> Parsed<f64> {
        parse_number(self.present(CanonicalField::Longitud))
    }

    pub fn position(&self) -> Parsed<i64> {
        parse_position(self.present(CanonicalField::Posicion))
    }
}

fn parse_number(text: Option<&str>) -> Parsed<f64> {
    match text {
        None => Parsed::Absent,
        Some(t) => match t.parse::<f64>() {
            Ok(v) if v.is_finite() => Parsed::Value(v),
            _ => Parsed::Invalid,
        },
    }
}

/// Positions are integers; spreadsheet exports often write them as `12.0`.
fn parse_position(text: Option<&str>) -> Parsed<i64> {
    match text {
        None => Parsed::Absent,
        Some(t) => {
            if let Ok(v) = t.parse::<i64>() {
                return Parsed::Value(v);
            }
            match t.parse::<f64>() {
                Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                    Parsed::Value(v as i64)
                }
                _ => Parsed::Invalid,
            }
        }
    }
}

/// One geo-referenced palm record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spot {
    pub latitude: f64,
    pub longitude: f64,
    pub linea: String,
    /// `None` when the position is missing or unparseable. `0` is valid.
    pub posicion: Option<i64>,
    pub lote: String,
    pub row_number: usize,
}

impl Spot {
    /// Project a normalized row; rows without both coordinates yield `None`.
    pub fn from_row(row: &NormalizedRow) -> Option<Spot> {
        let latitude = row.latitude().value()?;
        let longitude = row.longitude().value()?;
        Some(Spot {
            latitude,
            longitude,
            linea: row.present(CanonicalField::Linea).unwrap_or_default().to_string(),
            posicion: row.position().value(),
            lote: row.present(CanonicalField::Lote).unwrap_or_default().to_string(),
            row_number: row.row_number,
        })
    }
}

/// Build spots from normalized rows, skipping rows without coordinates.
pub fn extract_spots(rows: &[NormalizedRow]) -> Vec<Spot> {
    rows.iter().filter_map(Spot::from_row).collect()
}
