//! Command line arguments for spot-validator.
//!
//! Global output options apply to every subcommand. Environment overrides:
//! - `SPOT_VALIDATOR_FORMAT`: default output format
//! - `NO_COLOR`: disables colored terminal output when set

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "spot-validator")]
#[command(about = "Validate, correct, and map geo-referenced palm spot sheets")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text, env = "SPOT_VALIDATOR_FORMAT")]
    pub format: OutputFormat,

    /// Only print problems and the summary
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Include detected columns, timings, and debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Load configuration from a TOML file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            format: self.format,
            color: !self.no_color && std::env::var_os("NO_COLOR").is_none(),
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a spot sheet
    Validate(ValidateArgs),
    /// Write a corrected copy of a spot sheet
    Correct(CorrectArgs),
    /// Reconstruct planting lines from spot coordinates
    Lines(LinesArgs),
    /// Count spots, lots, and lines
    Stats(StatsArgs),
    /// List all checks
    List,
    /// Print version information
    Version,
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
    /// JUnit XML for CI/CD integration
    Junit,
}

/// Resolved global output options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub color: bool,
    pub verbose: bool,
    pub quiet: bool,
}

/// Which lots count as valid.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct LotArgs {
    /// Farm id used to look up registered lots
    #[arg(long, alias = "finca")]
    pub farm: Option<String>,

    /// Comma-separated list of valid lots (skips the lookup)
    #[arg(long, value_delimiter = ',')]
    pub lotes: Vec<String>,

    /// Never contact the remote validator
    #[arg(long)]
    pub local: bool,
}

impl LotArgs {
    /// Explicit lot set, if any non-blank lot was given.
    pub fn valid_lotes(&self) -> Option<BTreeSet<String>> {
        let lots: BTreeSet<String> = self
            .lotes
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        (!lots.is_empty()).then_some(lots)
    }

    pub fn farm_id(&self) -> Option<&str> {
        self.farm.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ValidateArgs {
    /// Spot sheet (CSV)
    pub file: PathBuf,

    #[command(flatten)]
    pub lots: LotArgs,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct CorrectArgs {
    /// Spot sheet (CSV)
    pub file: PathBuf,

    /// Output path (default: <stem>_corregido.csv next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also drop rows with empty required values
    #[arg(long)]
    pub remove_empty: bool,

    /// Keep every row and only fill in Estado/Errores
    #[arg(long, conflicts_with = "remove_empty")]
    pub mark_only: bool,

    /// Use a saved validation result (JSON) instead of validating again
    #[arg(long, value_name = "FILE")]
    pub errors: Option<PathBuf>,

    #[command(flatten)]
    pub lots: LotArgs,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LinesArgs {
    /// Spot sheet (CSV)
    pub file: PathBuf,

    /// Only reconstruct lines of this lot
    #[arg(long)]
    pub lote: Option<String>,

    /// Process at most this many (lote, linea) groups
    #[arg(long)]
    pub max_groups: Option<usize>,

    /// Write segments as GeoJSON to this path
    #[arg(long, value_name = "FILE")]
    pub geojson: Option<PathBuf>,

    /// Also compute lot perimeters (written next to --geojson when given)
    #[arg(long)]
    pub perimeter: bool,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct StatsArgs {
    /// Spot sheet (CSV)
    pub file: PathBuf,
}
