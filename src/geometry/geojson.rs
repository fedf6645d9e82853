//! GeoJSON export for map display.
//!
//! Positions are `[lon, lat]`. Single-point segments are written as `Point`
//! features; perimeters with fewer than three corners are skipped since they
//! cannot form a ring.

use super::{Coordinate, LineSegment, LotPerimeter};
use crate::data::Spot;
use serde_json::{json, Value};

fn collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": "EPSG:4326" } },
        "features": features
    })
}

pub fn spots_to_geojson(spots: &[Spot]) -> Value {
    let features = spots
        .iter()
        .enumerate()
        .map(|(id, spot)| {
            json!({
                "type": "Feature",
                "properties": {
                    "id": id,
                    "lote": spot.lote,
                    "linea": spot.linea,
                    "posicion": spot.posicion,
                    "latitud": spot.latitude,
                    "longitud": spot.longitude,
                    "row": spot.row_number
                },
                "geometry": { "type": "Point", "coordinates": Coordinate::of(spot).position() }
            })
        })
        .collect();
    collection(features)
}

pub fn segments_to_geojson(segments: &[LineSegment]) -> Value {
    let features = segments
        .iter()
        .map(|segment| {
            let positions: Vec<[f64; 2]> = segment.points.iter().map(Coordinate::position).collect();
            let geometry = match positions.as_slice() {
                [single] => json!({ "type": "Point", "coordinates": single }),
                _ => json!({ "type": "LineString", "coordinates": positions }),
            };
            json!({
                "type": "Feature",
                "properties": {
                    "lote": segment.lote,
                    "linea": segment.linea,
                    "point_count": segment.point_count(),
                    "position_range": segment.position_range(),
                    "distance_m": segment.distance_m
                },
                "geometry": geometry
            })
        })
        .collect();
    collection(features)
}

pub fn perimeters_to_geojson(perimeters: &[LotPerimeter]) -> Value {
    let features = perimeters
        .iter()
        .filter(|p| p.hull.len() >= 3)
        .map(|perimeter| {
            let mut ring: Vec<[f64; 2]> = perimeter.hull.iter().map(Coordinate::position).collect();
            ring.push(ring[0]);
            json!({
                "type": "Feature",
                "properties": { "lote": perimeter.lote, "spot_count": perimeter.spot_count },
                "geometry": { "type": "Polygon", "coordinates": [ring] }
            })
        })
        .collect();
    collection(features)
}
