//! CSV sheet reader.
//!
//! Turns an uploaded file into [`Sheet`]s for the local engine. The
//! delimiter is sniffed from the header line since spreadsheet exports in
//! Spanish locales commonly use `;`.

use super::rows::{RawRow, Sheet};
use crate::SpotError;
use std::path::Path;

/// An uploaded file: original name plus contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Upload {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an upload from disk, keeping only the file name.
    pub fn from_path(path: &Path) -> Result<Self, SpotError> {
        let bytes = std::fs::read(path).map_err(|e| SpotError::Io {
            context: format!("reading {}", path.display()),
            message: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Upload { file_name, bytes })
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }
}

/// Source of parsed sheets for an upload.
pub trait SheetReader {
    fn read_sheets(&self, upload: &Upload) -> Result<Vec<Sheet>, SpotError>;
}

/// Reads a single CSV sheet per upload.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSheetReader {
    /// Force a delimiter instead of sniffing it.
    pub delimiter: Option<u8>,
}

impl CsvSheetReader {
    pub fn new() -> Self {
        CsvSheetReader { delimiter: None }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        CsvSheetReader {
            delimiter: Some(delimiter),
        }
    }

    /// Parse CSV bytes into a sheet. Short records are padded with empty
    /// cells; cells past the last header are ignored.
    pub fn parse(&self, name: &str, bytes: &[u8]) -> Result<Sheet, SpotError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let delimiter = self.delimiter.unwrap_or_else(|| sniff_delimiter(bytes));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| parse_error(name, e))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| parse_error(name, e))?;
            let cells = headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string()))
                .collect();
            rows.push(RawRow::new(cells));
        }

        tracing::debug!(sheet = name, rows = rows.len(), delimiter = %(delimiter as char), "parsed csv sheet");
        Ok(Sheet::new(name, rows))
    }
}

impl SheetReader for CsvSheetReader {
    fn read_sheets(&self, upload: &Upload) -> Result<Vec<Sheet>, SpotError> {
        Ok(vec![self.parse(&upload.file_name, &upload.bytes)?])
    }
}

fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or(&[]);
    let count = |d: u8| header.iter().filter(|b| **b == d).count();
    if count(b';') > count(b',') {
        b';'
    } else if count(b'\t') > count(b',') {
        b'\t'
    } else {
        b','
    }
}

fn parse_error(name: &str, e: csv::Error) -> SpotError {
    SpotError::Parse {
        context: format!("csv sheet {}", name),
        message: e.to_string(),
    }
}
