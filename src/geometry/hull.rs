//! Convex hull and lot perimeters.

use super::Coordinate;
use crate::data::Spot;
use serde::Serialize;
use std::collections::BTreeMap;

fn cross(o: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    (a.lon - o.lon) * (b.lat - o.lat) - (a.lat - o.lat) * (b.lon - o.lon)
}

/// Monotone-chain convex hull, counter-clockwise, with `lon` as x.
///
/// Fewer than three points are returned unchanged. Collinear points on the
/// boundary are dropped.
pub fn convex_hull(points: &[Coordinate]) -> Vec<Coordinate> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.lon.total_cmp(&b.lon).then(a.lat.total_cmp(&b.lat)));

    let mut lower: Vec<Coordinate> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Coordinate> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Approximate boundary of one lot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotPerimeter {
    pub lote: String,
    pub spot_count: usize,
    pub hull: Vec<Coordinate>,
}

/// Hull of every lot's spots, ordered by lot name.
pub fn lot_perimeters(spots: &[Spot]) -> Vec<LotPerimeter> {
    let mut by_lot: BTreeMap<&str, Vec<Coordinate>> = BTreeMap::new();
    for spot in spots {
        by_lot
            .entry(spot.lote.as_str())
            .or_default()
            .push(Coordinate::of(spot));
    }
    by_lot
        .into_iter()
        .map(|(lote, points)| LotPerimeter {
            lote: lote.to_string(),
            spot_count: points.len(),
            hull: convex_hull(&points),
        })
        .collect()
}
