//! Spatial SQL helper functions over ST_Geometry blobs.
//!
//! The proprietary geodatabase extension normally provides these; here they
//! are plain scalar functions decoding the blob with a fixed coordinate
//! system, so bounding-box queries work on any SQLite connection.

use crate::crs::CoordinateSystem;
use crate::decoder::StGeometryDecoder;
use crate::error::{DecodeError, Result};
use crate::geometry::BoundingBox;

use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, ValueRef};
use rusqlite::{Connection, Error};

/// Register all spatial SQL helper functions in the provided connection.
///
/// Every function decodes with the given coordinate system, so register on
/// a connection whose spatial tables share one CRS (the common case for
/// Mobile Geodatabases).
///
/// Example:
/// ```no_run
/// use mobile_geodatabase::{register_spatial_functions, CoordinateSystem};
/// use rusqlite::Connection;
///
/// let conn = Connection::open("data.geodatabase")?;
/// register_spatial_functions(&conn, &CoordinateSystem::default())?;
/// # Ok::<(), mobile_geodatabase::GeodatabaseError>(())
/// ```
pub fn register_spatial_functions(conn: &Connection, cs: &CoordinateSystem) -> Result<()> {
    register_bounds_component(conn, "ST_MinX", cs, |b| b.xmin)?;
    register_bounds_component(conn, "ST_MinY", cs, |b| b.ymin)?;
    register_bounds_component(conn, "ST_MaxX", cs, |b| b.xmax)?;
    register_bounds_component(conn, "ST_MaxY", cs, |b| b.ymax)?;
    register_st_isempty(conn, cs)?;
    Ok(())
}

fn register_bounds_component<F>(
    conn: &Connection,
    name: &str,
    cs: &CoordinateSystem,
    f: F,
) -> Result<()>
where
    F: Fn(BoundingBox) -> f64 + Copy + Send + Sync + 'static,
{
    let decoder = StGeometryDecoder::new(cs.clone());
    conn.create_scalar_function(name, 1, FunctionFlags::SQLITE_DETERMINISTIC, move |ctx| {
        match ctx.get_raw(0) {
            ValueRef::Null => Ok(None),
            ValueRef::Blob(blob) => match decoder.decode(blob) {
                Ok(geometry) => Ok(geometry.bounds().map(f)),
                Err(DecodeError::EmptyGeometry) => Ok(None),
                Err(err) => Err(Error::UserFunctionError(Box::new(err))),
            },
            _ => Err(Error::InvalidFunctionParameterType(0, Type::Blob)),
        }
    })?;
    Ok(())
}

fn register_st_isempty(conn: &Connection, cs: &CoordinateSystem) -> Result<()> {
    let decoder = StGeometryDecoder::new(cs.clone());
    conn.create_scalar_function(
        "ST_IsEmpty",
        1,
        FunctionFlags::SQLITE_DETERMINISTIC,
        move |ctx| match ctx.get_raw(0) {
            ValueRef::Null => Ok(None),
            ValueRef::Blob(blob) => match decoder.decode(blob) {
                Ok(geometry) => Ok(Some(i64::from(geometry.bounds().is_none()))),
                Err(DecodeError::EmptyGeometry) => Ok(Some(1)),
                Err(err) => Err(Error::UserFunctionError(Box::new(err))),
            },
            _ => Err(Error::InvalidFunctionParameterType(0, Type::Blob)),
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::register_spatial_functions;
    use crate::crs::CoordinateSystem;
    use crate::error::Result;
    use crate::testing::BlobBuilder;
    use rusqlite::{params, Connection};

    fn test_cs() -> CoordinateSystem {
        CoordinateSystem::new(0.0, 0.0, 10_000.0)
    }

    fn raw(real: f64) -> u64 {
        (real * 20_000.0) as u64
    }

    #[test]
    fn st_bounds_for_point() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        register_spatial_functions(&conn, &test_cs())?;

        let blob = BlobBuilder::new(1)
            .header(0, 1)
            .varint(raw(10_000_000.0))
            .varint(raw(12_000_000.0))
            .build();

        let (minx, maxx, miny, maxy, empty): (f64, f64, f64, f64, i64) = conn.query_row(
            "SELECT ST_MinX(?1), ST_MaxX(?1), ST_MinY(?1), ST_MaxY(?1), ST_IsEmpty(?1)",
            params![blob],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            },
        )?;

        assert_eq!(minx, 10_000_000.0);
        assert_eq!(maxx, 10_000_000.0);
        assert_eq!(miny, 12_000_000.0);
        assert_eq!(maxy, 12_000_000.0);
        assert_eq!(empty, 0);
        Ok(())
    }

    #[test]
    fn st_bounds_for_line() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        register_spatial_functions(&conn, &test_cs())?;

        let blob = BlobBuilder::new(3)
            .header(0, 4)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(-40_000, 20_000)
            .delta_pair(100_000, -60_000)
            .build();

        let (minx, maxx, miny, maxy): (f64, f64, f64, f64) = conn.query_row(
            "SELECT ST_MinX(?1), ST_MaxX(?1), ST_MinY(?1), ST_MaxY(?1)",
            params![blob],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        assert!((minx - 9_999_998.0).abs() < 1e-6);
        assert!((maxx - 10_000_003.0).abs() < 1e-6);
        assert!((miny - 9_999_998.0).abs() < 1e-6);
        assert!((maxy - 10_000_001.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn null_geometry_yields_null() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        register_spatial_functions(&conn, &test_cs())?;

        let minx: Option<f64> =
            conn.query_row("SELECT ST_MinX(NULL)", [], |row| row.get(0))?;
        assert!(minx.is_none());
        Ok(())
    }

    #[test]
    fn empty_blob_reports_empty() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        register_spatial_functions(&conn, &test_cs())?;

        let blob = BlobBuilder::new(0).header(0, 4).build();
        let (minx, empty): (Option<f64>, i64) =
            conn.query_row("SELECT ST_MinX(?1), ST_IsEmpty(?1)", params![blob], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
        assert!(minx.is_none());
        assert_eq!(empty, 1);
        Ok(())
    }
}
