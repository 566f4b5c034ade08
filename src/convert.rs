//! Output format converters for decoded geometries and features.
//!
//! WKT and WKB go through the geo-traits based ecosystem writers; GeoJSON
//! is assembled as `serde_json` values so callers can embed or stream it.

use crate::database::{Feature, GeoDatabase, ReadOptions};
use crate::error::Result;
use crate::geometry::{Coord, Geometry, LineString};

use serde_json::{json, Map, Value as JsonValue};
use std::io::Write;

/// Render a geometry as Well-Known Text.
pub fn to_wkt(geometry: &Geometry) -> Result<String> {
    let mut out = String::new();
    wkt::to_wkt::write_geometry(&mut out, geometry)?;
    Ok(out)
}

/// Encode a geometry as Well-Known Binary (little-endian).
pub fn to_wkb(geometry: &Geometry) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    wkb::writer::write_geometry(&mut out, geometry, Default::default())?;
    Ok(out)
}

fn coord_json(coord: &Coord) -> JsonValue {
    match coord.z {
        Some(z) => json!([coord.x, coord.y, z]),
        None => json!([coord.x, coord.y]),
    }
}

fn line_json(line: &LineString) -> JsonValue {
    JsonValue::Array(line.points().iter().map(coord_json).collect())
}

/// Convert a geometry to a GeoJSON geometry object.
pub fn geometry_to_geojson(geometry: &Geometry) -> JsonValue {
    match geometry {
        Geometry::Point(point) => json!({
            "type": "Point",
            "coordinates": coord_json(&point.coord()),
        }),
        Geometry::LineString(line) => json!({
            "type": "LineString",
            "coordinates": line_json(line),
        }),
        Geometry::Polygon(polygon) => json!({
            "type": "Polygon",
            "coordinates": polygon.rings().iter().map(line_json).collect::<Vec<_>>(),
        }),
        Geometry::MultiPoint(points) => json!({
            "type": "MultiPoint",
            "coordinates": points.points().iter().map(coord_json).collect::<Vec<_>>(),
        }),
        Geometry::MultiLineString(lines) => json!({
            "type": "MultiLineString",
            "coordinates": lines.lines().iter().map(line_json).collect::<Vec<_>>(),
        }),
        Geometry::MultiPolygon(polygons) => json!({
            "type": "MultiPolygon",
            "coordinates": polygons
                .polygons()
                .iter()
                .map(|p| p.rings().iter().map(line_json).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
        }),
    }
}

fn sql_value_json(value: &rusqlite::types::Value) -> JsonValue {
    use rusqlite::types::Value;
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => json!(i),
        Value::Real(r) => json!(r),
        Value::Text(s) => json!(s),
        // binary attributes have no GeoJSON representation
        Value::Blob(_) => JsonValue::Null,
    }
}

/// Convert a feature to a GeoJSON Feature object.
pub fn feature_to_geojson(feature: &Feature) -> JsonValue {
    let mut properties = Map::new();
    for (name, value) in feature.attributes() {
        properties.insert(name.clone(), sql_value_json(value));
    }

    let mut out = json!({
        "type": "Feature",
        "properties": properties,
        "geometry": feature
            .geometry()
            .map(geometry_to_geojson)
            .unwrap_or(JsonValue::Null),
    });
    if let Some(fid) = feature.fid() {
        out["id"] = json!(fid);
    }
    out
}

/// Convert features to a GeoJSON FeatureCollection.
pub fn features_to_geojson<I>(features: I, crs: Option<&str>) -> JsonValue
where
    I: IntoIterator<Item = Feature>,
{
    let features: Vec<JsonValue> = features
        .into_iter()
        .map(|feature| feature_to_geojson(&feature))
        .collect();

    let mut out = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    if let Some(crs) = crs {
        out["crs"] = json!({ "type": "name", "properties": { "name": crs } });
    }
    out
}

/// Export a table as a GeoJSON FeatureCollection. Returns the number of
/// features written.
pub fn write_geojson<W: Write>(gdb: &GeoDatabase, table_name: &str, writer: W) -> Result<usize> {
    write_geojson_with(gdb, table_name, writer, &ReadOptions::default())
}

pub fn write_geojson_with<W: Write>(
    gdb: &GeoDatabase,
    table_name: &str,
    writer: W,
    options: &ReadOptions<'_>,
) -> Result<usize> {
    let table = gdb.table(table_name)?;
    let crs = table
        .coord_system
        .as_ref()
        .and_then(|cs| cs.srid)
        .map(|srid| format!("EPSG:{srid}"));

    let features: Vec<Feature> = gdb.read_table_with(table_name, options)?.collect();
    let count = features.len();
    let collection = features_to_geojson(features, crs.as_deref());
    serde_json::to_writer_pretty(writer, &collection)?;
    Ok(count)
}

/// Export a table as newline-delimited GeoJSON features, one per line.
/// Better suited to large tables than one giant FeatureCollection.
pub fn write_geojsonl<W: Write>(gdb: &GeoDatabase, table_name: &str, writer: W) -> Result<usize> {
    write_geojsonl_with(gdb, table_name, writer, &ReadOptions::default())
}

pub fn write_geojsonl_with<W: Write>(
    gdb: &GeoDatabase,
    table_name: &str,
    mut writer: W,
    options: &ReadOptions<'_>,
) -> Result<usize> {
    let mut count = 0;
    for feature in gdb.read_table_with(table_name, options)? {
        serde_json::to_writer(&mut writer, &feature_to_geojson(&feature))?;
        writer.write_all(b"\n")?;
        count += 1;
    }
    Ok(count)
}
