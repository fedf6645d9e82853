//! Line reconstruction command

use super::{load_spots, to_json_string, write_json, CommandOutput};
use crate::cli::args::{LinesArgs, OutputFormat, OutputOptions};
use crate::data::Spot;
use crate::geometry::geojson::{perimeters_to_geojson, segments_to_geojson};
use crate::geometry::{lot_perimeters, LotPerimeter, Reconstruction, SpatialLineReconstructor};
use crate::{SpotCheckConfig, SpotError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinesReport {
    pub spots: usize,
    #[serde(flatten)]
    pub reconstruction: Reconstruction,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub perimeters: Vec<LotPerimeter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub written: Vec<PathBuf>,
}

/// Run the lines command
pub fn run(
    args: &LinesArgs,
    options: &OutputOptions,
    config: &SpotCheckConfig,
) -> Result<CommandOutput, SpotError> {
    let spots: Vec<Spot> = load_spots(&args.file)?;
    let lote = args.lote.as_deref();

    let mut line_config = config.lines.clone();
    if args.max_groups.is_some() {
        line_config.max_groups = args.max_groups;
    }
    let reconstruction = SpatialLineReconstructor::new(line_config).reconstruct_lote(&spots, lote);

    let selected: Vec<Spot> = spots
        .into_iter()
        .filter(|s| lote.is_none_or(|l| l == s.lote))
        .collect();
    let perimeters = if args.perimeter {
        lot_perimeters(&selected)
    } else {
        Vec::new()
    };

    let mut written = Vec::new();
    if let Some(path) = &args.geojson {
        write_json(path, &segments_to_geojson(&reconstruction.segments))?;
        written.push(path.clone());
        if args.perimeter {
            let perimeter_path = perimeter_path(path);
            write_json(&perimeter_path, &perimeters_to_geojson(&perimeters))?;
            written.push(perimeter_path);
        }
        info!(files = written.len(), "geojson written");
    }

    let report = LinesReport {
        spots: selected.len(),
        reconstruction,
        perimeters,
        written,
    };
    let text = match options.format {
        OutputFormat::Json => to_json_string(&report)?,
        _ => format_text(&report, options.verbose),
    };
    Ok(CommandOutput::clean(text))
}

/// `segments.geojson` -> `segments_perimetros.geojson`
fn perimeter_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("lines");
    path.with_file_name(format!("{}_perimetros.geojson", stem))
}

fn format_text(report: &LinesReport, verbose: bool) -> String {
    let rec = &report.reconstruction;
    let mut output = String::new();
    output.push_str(&format!(
        "Spots: {}  Groups: {}/{}  Segments: {}\n",
        report.spots,
        rec.groups_processed,
        rec.groups_total,
        rec.segments.len()
    ));
    if rec.truncated {
        output.push_str(&format!(
            "  [WARN] only the first {} of {} (lote, linea) groups were processed\n",
            rec.groups_processed, rec.groups_total
        ));
    }
    output.push('\n');

    for segment in &rec.segments {
        output.push_str(&format!(
            "  lote {:<10} linea {:<6} points {:>4}  positions {:<10} {:>9.1} m\n",
            segment.lote,
            segment.linea,
            segment.point_count(),
            segment.position_range(),
            segment.distance_m
        ));
        if verbose {
            if let (Some(first), Some(last)) = (segment.first(), segment.last()) {
                output.push_str(&format!(
                    "    from ({:.6}, {:.6}) to ({:.6}, {:.6})\n",
                    first.lat, first.lon, last.lat, last.lon
                ));
            }
        }
    }

    if !report.perimeters.is_empty() {
        output.push_str("\nPERIMETERS\n");
        for perimeter in &report.perimeters {
            output.push_str(&format!(
                "  lote {:<10} spots {:>5}  hull points {:>3}\n",
                perimeter.lote,
                perimeter.spot_count,
                perimeter.hull.len()
            ));
        }
    }

    for path in &report.written {
        output.push_str(&format!("\nWrote {}", path.display()));
    }
    output
}
