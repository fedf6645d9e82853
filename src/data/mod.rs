//! Spot sheet data: raw rows, header normalization, and CSV input.

pub mod columns;
pub mod reader;
pub mod rows;

pub use columns::ColumnNormalizer;
pub use reader::{CsvSheetReader, SheetReader, Upload};
pub use rows::{extract_spots, CanonicalField, NormalizedRow, Parsed, RawRow, Sheet, Spot};
