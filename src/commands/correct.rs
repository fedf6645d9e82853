//! Correction export command
//!
//! Validates the sheet (or loads a saved result) and writes
//! `<stem>_corregido.csv` next to the input unless `--output` is given.

use super::{read_sheets, to_json_string, CommandOutput};
use crate::cli::args::{CorrectArgs, OutputFormat, OutputOptions};
use crate::correction::{corrected_file_name, CorrectionFileGenerator};
use crate::engine::result::ValidationResult;
use crate::{build_orchestrator, SpotCheckConfig, SpotError};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows_total: usize,
    pub rows_kept: usize,
    pub rows_removed: usize,
    pub rows_marked: usize,
    pub removed_rows: Vec<usize>,
    pub mark_only: bool,
}

/// Run the correct command
pub fn run(
    args: &CorrectArgs,
    options: &OutputOptions,
    config: &SpotCheckConfig,
) -> Result<CommandOutput, SpotError> {
    let (upload, sheets) = read_sheets(&args.file)?;

    let result = match &args.errors {
        Some(path) => load_result(path)?,
        None => {
            let valid_lotes = args.lots.valid_lotes();
            build_orchestrator(config, args.lots.local)
                .resolve(&upload, args.lots.farm_id(), valid_lotes.as_ref())?
                .result
        }
    };

    let generator = CorrectionFileGenerator::new();
    let export = if args.mark_only {
        generator.annotate(&sheets, &result)?
    } else {
        generator.generate_sheets(&sheets, &result, args.remove_empty)?
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.file, upload.stem()));
    export.write_to(&output)?;

    let report = CorrectionReport {
        input: args.file.clone(),
        output,
        rows_total: result.meta.rows_total,
        rows_kept: export.rows.len(),
        rows_removed: export.removed_rows.len(),
        rows_marked: export.error_rows(),
        removed_rows: export.removed_rows.clone(),
        mark_only: args.mark_only,
    };

    let text = match options.format {
        OutputFormat::Json => to_json_string(&report)?,
        _ => format_text(&report, options.verbose),
    };
    Ok(CommandOutput::clean(text))
}

/// Load a saved validation result. A saved outcome (with `validator_used`)
/// is accepted as well.
pub fn load_result(path: &Path) -> Result<ValidationResult, SpotError> {
    let text = std::fs::read_to_string(path).map_err(|e| SpotError::Io {
        context: format!("reading {}", path.display()),
        message: e.to_string(),
    })?;
    let result: ValidationResult = serde_json::from_str(&text).map_err(|e| SpotError::Parse {
        context: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(ValidationResult::new(result.meta, result.columns_detected, result.errors))
}

fn default_output_path(input: &Path, stem: &str) -> PathBuf {
    input.with_file_name(corrected_file_name(stem))
}

fn format_text(report: &CorrectionReport, verbose: bool) -> String {
    let mut output = String::new();
    output.push_str(&format!("Corrected file: {}\n", report.output.display()));
    output.push_str(&format!("  Rows read:    {}\n", report.rows_total));
    output.push_str(&format!("  Rows kept:    {}\n", report.rows_kept));
    output.push_str(&format!("  Rows removed: {}\n", report.rows_removed));
    output.push_str(&format!("  Rows marked:  {}\n", report.rows_marked));
    if verbose && !report.removed_rows.is_empty() {
        let rows: Vec<String> = report.removed_rows.iter().map(|r| r.to_string()).collect();
        output.push_str(&format!("  Removed: {}\n", rows.join(", ")));
    }
    if report.mark_only {
        output.push_str("  (mark only, no rows removed)\n");
    }
    output
}
