//! Read Esri Mobile Geodatabase (.geodatabase) files with a small,
//! rusqlite-backed API.
//!
//! A Mobile Geodatabase is a SQLite database whose spatial tables store
//! geometries in Esri's proprietary ST_Geometry blob format. This crate
//! decodes that format directly, so no proprietary extension library is
//! needed.
//!
//! ## Reading a geodatabase
//!
//! ```no_run
//! use mobile_geodatabase::{to_wkt, GeoDatabase};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gdb = GeoDatabase::open("data.geodatabase")?;
//!     for table in gdb.tables()? {
//!         if !table.has_geometry() {
//!             continue;
//!         }
//!         for feature in gdb.read_table(&table.name)? {
//!             if let Some(geometry) = feature.geometry() {
//!                 println!("{}: {}", table.name, to_wkt(geometry)?);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Decoding a single blob
//!
//! When the blob and the table's coordinate system parameters come from
//! elsewhere, the decoder can be used on its own:
//!
//! ```
//! use mobile_geodatabase::{decode_geometry, CoordinateSystem, Geometry};
//!
//! let cs = CoordinateSystem::new(-20037700.0, -30241100.0, 10000.0);
//! let blob: &[u8] = &[
//!     0x64, 0x11, 0x0F, 0x00, 0x01, 0x00, 0x00, 0x00, 0x04, 0x01, 0x0C,
//!     0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x81, 0xE8, 0x8C, 0xFA,
//!     0x80, 0x04, 0xA2, 0xCB, 0xB9, 0xC0, 0x89, 0x15,
//! ];
//! let geometry = decode_geometry(blob, &cs)?;
//! assert!(matches!(geometry, Geometry::Point(_)));
//! # Ok::<(), mobile_geodatabase::DecodeError>(())
//! ```
mod conversions;
mod convert;
mod crs;
mod database;
mod decoder;
mod error;
mod geometry;
mod sql_functions;
mod traits;
mod varint;

#[cfg(test)]
mod testing;

pub use convert::{
    feature_to_geojson, features_to_geojson, geometry_to_geojson, to_wkb, to_wkt, write_geojson,
    write_geojson_with, write_geojsonl, write_geojsonl_with,
};
pub use crs::CoordinateSystem;
pub use database::{Feature, FeatureIterator, GeoDatabase, ReadOptions, TableInfo};
pub use decoder::{decode_geometry, StGeometryDecoder, COORD_THRESHOLD, MAGIC};
pub use error::{DecodeError, GeodatabaseError, Result};
pub use geometry::{
    BoundingBox, Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};
pub use sql_functions::register_spatial_functions;

// Re-export the value type used in feature attributes to keep the public
// API stable.
pub use rusqlite::types::Value;
