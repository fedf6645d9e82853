//! Spatial helpers for spot sheets: great-circle distance, line
//! reconstruction, lot perimeters, and GeoJSON export.

pub mod geojson;
pub mod hull;
pub mod lines;

use crate::data::Spot;
use serde::Serialize;

pub use hull::{convex_hull, lot_perimeters, LotPerimeter};
pub use lines::{LineConfig, LineSegment, Reconstruction, SpatialLineReconstructor};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point in degrees, longitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Coordinate { lon, lat }
    }

    pub fn of(spot: &Spot) -> Self {
        Coordinate::new(spot.longitude, spot.latitude)
    }

    /// `[lon, lat]`, the GeoJSON position order.
    pub fn position(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Haversine distance in meters.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}
