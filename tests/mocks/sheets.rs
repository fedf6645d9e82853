//! Spot sheet fixtures.

use spot_validator::data::{RawRow, Sheet, Upload};

/// Two clean rows in lot L1.
pub const CLEAN_SHEET: &str = "latitud,longitud,linea,posicion,lote\n\
                               7.3365,-76.7232,1,1,L1\n\
                               7.3366,-76.7232,1,2,L1\n";

/// Same coordinates on rows 2 and 3, different position.
pub const DUPLICATE_COORDS_SHEET: &str = "latitud,longitud,linea,posicion,lote\n\
                                          7.3365,-76.7232,1,1,L1\n\
                                          7.3365,-76.7232,1,2,L1\n";

/// Field-export style headers with no lot column.
pub const NO_LOTE_SHEET: &str = "Lat,Lng,Linea,Palma\n\
                                 7.3365,-76.7232,1,1\n\
                                 7.3366,-76.7232,1,2\n";

pub fn upload(name: &str, contents: &str) -> Upload {
    Upload::new(name, contents.as_bytes().to_vec())
}

/// A spot row with canonical headers.
pub fn spot_row(lat: &str, lon: &str, linea: &str, posicion: &str, lote: &str) -> RawRow {
    RawRow::from_pairs([
        ("latitud", lat),
        ("longitud", lon),
        ("linea", linea),
        ("posicion", posicion),
        ("lote", lote),
    ])
}

pub fn single_sheet(rows: Vec<RawRow>) -> Vec<Sheet> {
    vec![Sheet::new("Hoja1", rows)]
}
