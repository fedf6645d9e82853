//! Line reconstruction and lot perimeter tests over parsed sheets.

use spot_validator::data::{extract_spots, ColumnNormalizer, CsvSheetReader, Spot};
use spot_validator::geometry::geojson::{segments_to_geojson, spots_to_geojson};
use spot_validator::geometry::{
    convex_hull, haversine_m, lot_perimeters, Coordinate, LineConfig, SpatialLineReconstructor,
};

// 10 m of latitude.
const STEP_DEG: f64 = 10.0 / 111_194.93;

fn sheet_spots(csv: &str) -> Vec<Spot> {
    let sheet = CsvSheetReader::new().parse("spots.csv", csv.as_bytes()).unwrap();
    extract_spots(&ColumnNormalizer::new().normalize_sheets(&[sheet]))
}

fn chain_csv(count: usize) -> String {
    let mut csv = String::from("Lat;Lng;Linea;Palma;Lote\n");
    for i in 0..count {
        csv.push_str(&format!("{:.8};-76.0;7;{};Norte\n", 7.0 + i as f64 * STEP_DEG, i + 1));
    }
    csv
}

#[test]
fn test_chain_from_sheet_is_one_line() {
    let spots = sheet_spots(&chain_csv(5));
    assert_eq!(spots.len(), 5);
    let rec = SpatialLineReconstructor::default().reconstruct(&spots);
    assert_eq!(rec.segments.len(), 1);
    let segment = &rec.segments[0];
    assert_eq!(segment.point_count(), 5);
    assert_eq!(segment.position_range(), "1-5");
    assert!((segment.distance_m - 40.0).abs() < 0.05, "{}", segment.distance_m);
}

#[test]
fn test_distant_sixth_spot_splits_line() {
    let mut csv = chain_csv(5);
    csv.push_str(&format!("{:.8};-76.0;7;6;Norte\n", 7.0 + 24.0 * STEP_DEG));
    let rec = SpatialLineReconstructor::default().reconstruct(&sheet_spots(&csv));
    let counts: Vec<usize> = rec.segments.iter().map(|s| s.point_count()).collect();
    assert_eq!(counts, vec![5, 1]);
}

#[test]
fn test_tighter_threshold_from_config() {
    let config = LineConfig {
        soft_threshold_m: 5.0,
        ..Default::default()
    };
    let rec = SpatialLineReconstructor::new(config).reconstruct(&sheet_spots(&chain_csv(3)));
    assert_eq!(rec.segments.len(), 1);
    assert_eq!(rec.segments[0].point_count(), 1);
}

#[test]
fn test_segments_geojson_is_lon_lat() {
    let rec = SpatialLineReconstructor::default().reconstruct(&sheet_spots(&chain_csv(2)));
    let value = segments_to_geojson(&rec.segments);
    let first = &value["features"][0]["geometry"]["coordinates"][0];
    assert_eq!(first[0], -76.0);
    assert_eq!(first[1], 7.0);
    assert_eq!(value["features"][0]["properties"]["lote"], "Norte");
}

#[test]
fn test_spot_features_skip_rows_without_coordinates() {
    let spots = sheet_spots("latitud,longitud,linea,posicion,lote\n7.1,-76.1,1,1,L1\n,,1,2,L1\n");
    let value = spots_to_geojson(&spots);
    assert_eq!(value["features"].as_array().unwrap().len(), 1);
}

#[test]
fn test_perimeter_contains_every_spot() {
    let mut csv = String::from("latitud,longitud,linea,posicion,lote\n");
    for linea in 0..6 {
        for pos in 0..8 {
            let jitter = ((linea * 7 + pos * 3) % 5) as f64 * 1e-6;
            csv.push_str(&format!(
                "{:.7},{:.7},{},{},Sur\n",
                3.88 + pos as f64 * 8e-5 + jitter,
                -73.65 + linea as f64 * 9e-5,
                linea + 1,
                pos + 1
            ));
        }
    }
    let spots = sheet_spots(&csv);
    let perimeters = lot_perimeters(&spots);
    assert_eq!(perimeters.len(), 1);
    let hull = &perimeters[0].hull;
    assert!(hull.len() >= 4);

    for spot in &spots {
        let p = Coordinate::of(spot);
        let inside = (0..hull.len()).all(|i| {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            (b.lon - a.lon) * (p.lat - a.lat) - (b.lat - a.lat) * (p.lon - a.lon) >= -1e-12
        });
        assert!(inside, "spot at row {} outside hull", spot.row_number);
    }
}

#[test]
fn test_hull_of_three_points_is_those_points() {
    let points = vec![
        Coordinate::new(-73.0, 3.0),
        Coordinate::new(-72.9, 3.0),
        Coordinate::new(-72.95, 3.1),
    ];
    let hull = convex_hull(&points);
    assert_eq!(hull.len(), 3);
    assert!(points.iter().all(|p| hull.contains(p)));
}

#[test]
fn test_haversine_matches_step() {
    let d = haversine_m(Coordinate::new(-76.0, 7.0), Coordinate::new(-76.0, 7.0 + STEP_DEG));
    assert!((d - 10.0).abs() < 1e-6);
}
