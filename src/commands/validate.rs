//! Spot sheet validation command

use super::CommandOutput;
use crate::cli::args::{OutputOptions, ValidateArgs};
use crate::cli::output::formatter_for;
use crate::{run_validation, SpotCheckConfig, SpotError};

/// Run the validate command
pub fn run(
    args: &ValidateArgs,
    options: &OutputOptions,
    config: &SpotCheckConfig,
) -> Result<CommandOutput, SpotError> {
    let valid_lotes = args.lots.valid_lotes();
    let outcome = run_validation(
        config,
        &args.file,
        args.lots.farm_id(),
        valid_lotes.as_ref(),
        args.lots.local,
    )?;

    Ok(CommandOutput {
        text: formatter_for(options).format(&outcome),
        has_errors: !outcome.result.ok,
    })
}
