//! Line reconstruction.
//!
//! Spots carry a nominal line and position, but capture order and gaps mean
//! a drawable path has to be rebuilt from geometry:
//!
//! 1. Group by `(lote, linea)`
//! 2. Stable sort each group by position (missing = 0)
//! 3. Walk the group; a point continues the current segment while the hop
//!    is within the soft threshold, under the hard cap, and the position gap
//!    is small enough. A segment closed mid-walk is kept only with two or
//!    more points; the trailing segment is always kept.
//! 4. One linear merge scan joins a segment to the first later, unmerged
//!    segment whose first point lies within the soft threshold of its last
//!    point. Each segment merges at most once.
//!
//! The merge is a heuristic, not an optimal clustering. Groups are
//! independent; with the `parallel` feature they run on the rayon pool.

use super::{haversine_m, Coordinate};
use crate::data::Spot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// Largest hop (and merge gap) that keeps points on one segment.
    pub soft_threshold_m: f64,
    /// Hops at or above this always split.
    pub hard_cap_m: f64,
    pub max_position_gap: u64,
    /// Process at most this many groups; the rest are reported as truncated.
    pub max_groups: Option<usize>,
}

impl Default for LineConfig {
    fn default() -> Self {
        LineConfig {
            soft_threshold_m: 50.0,
            hard_cap_m: 100.0,
            max_position_gap: 10,
            max_groups: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSegment {
    pub lote: String,
    pub linea: String,
    pub points: Vec<Coordinate>,
    /// Position of each point (missing = 0), parallel to `points`.
    pub positions: Vec<i64>,
    /// Along-path length in meters.
    pub distance_m: f64,
}

impl LineSegment {
    fn start(lote: &str, linea: &str, spot: &Spot) -> Self {
        LineSegment {
            lote: lote.to_string(),
            linea: linea.to_string(),
            points: vec![Coordinate::of(spot)],
            positions: vec![spot.posicion.unwrap_or(0)],
            distance_m: 0.0,
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }

    /// `(min, max)` of the positions in the segment.
    pub fn position_bounds(&self) -> (i64, i64) {
        let min = self.positions.iter().copied().min().unwrap_or(0);
        let max = self.positions.iter().copied().max().unwrap_or(0);
        (min, max)
    }

    /// Position range as `min-max`.
    pub fn position_range(&self) -> String {
        let (min, max) = self.position_bounds();
        format!("{}-{}", min, max)
    }

    fn push(&mut self, spot: &Spot, hop_m: f64) {
        self.points.push(Coordinate::of(spot));
        self.positions.push(spot.posicion.unwrap_or(0));
        self.distance_m += hop_m;
    }

    fn append(&mut self, other: &LineSegment, bridge_m: f64) {
        self.points.extend_from_slice(&other.points);
        self.positions.extend_from_slice(&other.positions);
        self.distance_m += bridge_m + other.distance_m;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reconstruction {
    pub segments: Vec<LineSegment>,
    pub groups_total: usize,
    pub groups_processed: usize,
    /// True when `max_groups` left groups out.
    pub truncated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SpatialLineReconstructor {
    config: LineConfig,
}

impl SpatialLineReconstructor {
    pub fn new(config: LineConfig) -> Self {
        SpatialLineReconstructor { config }
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    pub fn reconstruct(&self, spots: &[Spot]) -> Reconstruction {
        self.reconstruct_lote(spots, None)
    }

    /// Reconstruct only spots of `lote` when given.
    pub fn reconstruct_lote(&self, spots: &[Spot], lote: Option<&str>) -> Reconstruction {
        let mut groups: BTreeMap<(&str, &str), Vec<&Spot>> = BTreeMap::new();
        for spot in spots {
            if lote.is_some_and(|l| l != spot.lote) {
                continue;
            }
            groups
                .entry((spot.lote.as_str(), spot.linea.as_str()))
                .or_default()
                .push(spot);
        }

        let groups_total = groups.len();
        let limit = self.config.max_groups.unwrap_or(groups_total).min(groups_total);
        if limit < groups_total {
            warn!(
                groups_total,
                groups_processed = limit,
                "line reconstruction truncated by group cap"
            );
        }
        let groups: Vec<_> = groups.into_iter().take(limit).collect();

        #[cfg(feature = "parallel")]
        let per_group: Vec<Vec<LineSegment>> = groups
            .par_iter()
            .map(|((lote, linea), members)| self.reconstruct_group(lote, linea, members))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let per_group: Vec<Vec<LineSegment>> = groups
            .iter()
            .map(|((lote, linea), members)| self.reconstruct_group(lote, linea, members))
            .collect();

        let segments: Vec<LineSegment> = per_group.into_iter().flatten().collect();
        debug!(groups = limit, segments = segments.len(), "lines reconstructed");
        Reconstruction {
            segments,
            groups_total,
            groups_processed: limit,
            truncated: limit < groups_total,
        }
    }

    /// Walk and merge one `(lote, linea)` group.
    pub fn reconstruct_group(&self, lote: &str, linea: &str, members: &[&Spot]) -> Vec<LineSegment> {
        let mut sorted: Vec<&Spot> = members.to_vec();
        sorted.sort_by_key(|s| s.posicion.unwrap_or(0));

        let Some((first, rest)) = sorted.split_first() else {
            return Vec::new();
        };

        let mut segments = Vec::new();
        let mut current = LineSegment::start(lote, linea, first);
        let mut previous = *first;
        for spot in rest {
            let hop = haversine_m(Coordinate::of(previous), Coordinate::of(spot));
            let gap = spot.posicion.unwrap_or(0).abs_diff(previous.posicion.unwrap_or(0));
            if self.continues(hop, gap) {
                current.push(spot, hop);
            } else {
                let closed = std::mem::replace(&mut current, LineSegment::start(lote, linea, spot));
                if closed.point_count() >= 2 {
                    segments.push(closed);
                }
            }
            previous = *spot;
        }
        segments.push(current);

        self.merge(segments)
    }

    fn continues(&self, hop_m: f64, position_gap: u64) -> bool {
        hop_m <= self.config.soft_threshold_m
            && position_gap <= self.config.max_position_gap
            && hop_m < self.config.hard_cap_m
    }

    fn merge(&self, segments: Vec<LineSegment>) -> Vec<LineSegment> {
        let mut merged = vec![false; segments.len()];
        let mut out = Vec::with_capacity(segments.len());
        for i in 0..segments.len() {
            if merged[i] {
                continue;
            }
            let mut segment = segments[i].clone();
            for j in (i + 1)..segments.len() {
                if merged[j] {
                    continue;
                }
                let (Some(end), Some(start)) = (segment.last(), segments[j].first()) else {
                    continue;
                };
                let bridge = haversine_m(end, start);
                if bridge <= self.config.soft_threshold_m {
                    segment.append(&segments[j], bridge);
                    merged[j] = true;
                    break;
                }
            }
            out.push(segment);
        }
        out
    }
}
