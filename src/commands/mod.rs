//! Command handlers for spot-validator
//!
//! This module contains implementations for the spot-validator commands:
//! - `validate`: Validate a spot sheet (remote validator with local fallback)
//! - `correct`: Write a corrected copy of a spot sheet
//! - `lines`: Reconstruct planting lines and lot perimeters
//! - `stats`: Count spots, lots, and lines
//!
//! Every handler returns its rendered output; printing and exit codes are
//! left to the binary.

pub mod correct;
pub mod lines;
pub mod stats;
pub mod validate;

use crate::data::{extract_spots, ColumnNormalizer, CsvSheetReader, Sheet, SheetReader, Spot, Upload};
use crate::SpotError;
use std::path::Path;

/// Rendered command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    /// True when the command reports validation errors (exit code 1).
    pub has_errors: bool,
}

impl CommandOutput {
    pub fn clean(text: String) -> Self {
        CommandOutput {
            text,
            has_errors: false,
        }
    }
}

/// Read a spot sheet from disk.
pub(crate) fn read_sheets(path: &Path) -> Result<(Upload, Vec<Sheet>), SpotError> {
    let upload = Upload::from_path(path)?;
    let sheets = CsvSheetReader::new().read_sheets(&upload)?;
    Ok((upload, sheets))
}

/// Spots of every row with parseable coordinates.
pub(crate) fn load_spots(path: &Path) -> Result<Vec<Spot>, SpotError> {
    let (_, sheets) = read_sheets(path)?;
    Ok(extract_spots(&ColumnNormalizer::new().normalize_sheets(&sheets)))
}

pub(crate) fn write_json(path: &Path, value: &serde_json::Value) -> Result<(), SpotError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| SpotError::Parse {
        context: format!("encoding {}", path.display()),
        message: e.to_string(),
    })?;
    std::fs::write(path, text).map_err(|e| SpotError::Io {
        context: format!("writing {}", path.display()),
        message: e.to_string(),
    })
}

pub(crate) fn to_json_string<T: serde::Serialize>(value: &T) -> Result<String, SpotError> {
    serde_json::to_string_pretty(value).map_err(|e| SpotError::Parse {
        context: "encoding output".to_string(),
        message: e.to_string(),
    })
}
