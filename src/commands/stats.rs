//! Spot statistics command
//!
//! Counts spots (rows with both coordinates), distinct lots, and distinct
//! line names. Names keep the order they first appear in the sheet.

use super::{load_spots, to_json_string, CommandOutput};
use crate::cli::args::{OutputFormat, OutputOptions, StatsArgs};
use crate::data::Spot;
use crate::SpotError;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpotStats {
    pub total_spots: usize,
    pub lotes: Vec<String>,
    pub lineas: Vec<String>,
}

impl SpotStats {
    pub fn from_spots(spots: &[Spot]) -> Self {
        let mut stats = SpotStats {
            total_spots: spots.len(),
            ..Default::default()
        };
        let mut seen_lotes: HashSet<&str> = HashSet::new();
        let mut seen_lineas: HashSet<&str> = HashSet::new();
        for spot in spots {
            if !spot.lote.is_empty() && seen_lotes.insert(&spot.lote) {
                stats.lotes.push(spot.lote.clone());
            }
            if !spot.linea.is_empty() && seen_lineas.insert(&spot.linea) {
                stats.lineas.push(spot.linea.clone());
            }
        }
        stats
    }
}

/// Run the stats command
pub fn run(args: &StatsArgs, options: &OutputOptions) -> Result<CommandOutput, SpotError> {
    let stats = SpotStats::from_spots(&load_spots(&args.file)?);
    let text = match options.format {
        OutputFormat::Json => to_json_string(&stats)?,
        _ => format_text(&stats, options.verbose),
    };
    Ok(CommandOutput::clean(text))
}

fn format_text(stats: &SpotStats, verbose: bool) -> String {
    let mut output = String::new();
    output.push_str(&format!("Spots:  {}\n", stats.total_spots));
    output.push_str(&format!("Lotes:  {}\n", stats.lotes.len()));
    output.push_str(&format!("Lineas: {}\n", stats.lineas.len()));
    if verbose {
        output.push_str(&format!("\nLotes:  {}\n", stats.lotes.join(", ")));
        output.push_str(&format!("Lineas: {}\n", stats.lineas.join(", ")));
    }
    output
}
