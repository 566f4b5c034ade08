//! High-level reader for Mobile Geodatabase files.
//!
//! A `.geodatabase` file is a SQLite database: spatial tables carry an
//! ST_Geometry blob column, `st_geometry_columns` registers them, and
//! `GDB_Items` stores each table's definition XML including the coordinate
//! system parameters the decoder needs.

use crate::conversions::{geometry_type_has_z, geometry_type_name};
use crate::crs::CoordinateSystem;
use crate::decoder::StGeometryDecoder;
use crate::error::{GeodatabaseError, Result};
use crate::geometry::Geometry;

use regex::Regex;
use rusqlite::types::Value;
use rusqlite::OpenFlags;
use std::collections::HashMap;
use std::path::Path;

/// Mobile Geodatabase connection wrapper for reading spatial tables.
pub struct GeoDatabase {
    conn: rusqlite::Connection,
}

struct GeometryColumnInfo {
    column: String,
    type_code: Option<i64>,
    srid: Option<i64>,
}

impl GeoDatabase {
    /// Open a geodatabase file in read-only mode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = rusqlite::Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Self::from_connection(conn)
    }

    /// Wrap an already-open connection, e.g. an in-memory database or one
    /// opened with custom flags.
    pub fn from_connection(conn: rusqlite::Connection) -> Result<Self> {
        let gdb = Self { conn };
        gdb.validate()?;
        Ok(gdb)
    }

    fn validate(&self) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'GDB_Items'")?;
        if !stmt.exists([])? {
            return Err(GeodatabaseError::NotAGeodatabase(
                "missing GDB_Items table".to_string(),
            ));
        }
        Ok(())
    }

    /// Names of the user tables.
    pub fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tables()?.into_iter().map(|t| t.name).collect())
    }

    /// Describe all user tables, spatial or not.
    pub fn tables(&self) -> Result<Vec<TableInfo>> {
        let registry = self.geometry_registry()?;

        let mut stmt = self.conn.prepare(
            "
SELECT name FROM sqlite_master
WHERE type = 'table'
AND name NOT LIKE 'sqlite_%'
AND name NOT LIKE 'GDB_%'
AND name NOT LIKE 'st_%'
",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let info = self.table_info(&name, registry.get(&name))?;
            tables.push(info);
        }
        Ok(tables)
    }

    /// Look up one table by name (case-insensitive).
    pub fn table(&self, name: &str) -> Result<TableInfo> {
        self.tables()?
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| GeodatabaseError::TableNotFound(name.to_string()))
    }

    /// Read all features of a table.
    pub fn read_table(&self, table_name: &str) -> Result<FeatureIterator> {
        self.read_table_with(table_name, &ReadOptions::default())
    }

    /// Read features with column selection, a WHERE clause, or a limit.
    ///
    /// The geometry column and OBJECTID are always included regardless of
    /// the column selection. A row whose blob fails to decode keeps its
    /// attributes and comes through with no geometry; one bad blob never
    /// poisons the rest of the table.
    pub fn read_table_with(
        &self,
        table_name: &str,
        options: &ReadOptions<'_>,
    ) -> Result<FeatureIterator> {
        let table = self.table(table_name)?;
        let cs = table
            .coord_system
            .clone()
            .unwrap_or_default();
        let decoder = StGeometryDecoder::new(cs);

        let column_sql = match options.columns {
            Some(cols) => {
                let mut selected: Vec<String> = Vec::new();
                if let Some(objectid) = table
                    .columns
                    .iter()
                    .find(|c| c.eq_ignore_ascii_case("objectid"))
                {
                    selected.push(objectid.clone());
                }
                for col in cols {
                    if !selected.iter().any(|c| c.eq_ignore_ascii_case(col)) {
                        selected.push((*col).to_string());
                    }
                }
                if let Some(geometry_column) = &table.geometry_column {
                    if !selected
                        .iter()
                        .any(|c| c.eq_ignore_ascii_case(geometry_column))
                    {
                        selected.push(geometry_column.clone());
                    }
                }
                selected
                    .iter()
                    .map(|c| format!(r#""{c}""#))
                    .collect::<Vec<String>>()
                    .join(", ")
            }
            None => "*".to_string(),
        };

        let mut sql = format!(r#"SELECT {} FROM "{}""#, column_sql, table.name);
        if let Some(where_clause) = options.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(where_clause);
        }
        sql.push_str(" ORDER BY rowid");
        if let Some(limit) = options.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let geometry_column = table.geometry_column.clone();

        let features = stmt
            .query_map([], |row| {
                let mut geometry: Option<Geometry> = None;
                let mut fid: Option<i64> = None;
                let mut attributes = Vec::with_capacity(column_names.len());

                for (idx, name) in column_names.iter().enumerate() {
                    let value = Value::from(row.get_ref(idx)?);
                    let is_geometry = geometry_column
                        .as_deref()
                        .is_some_and(|g| g.eq_ignore_ascii_case(name));
                    if is_geometry {
                        if let Value::Blob(bytes) = &value {
                            geometry = decoder.decode(bytes).ok();
                        }
                    } else if name.eq_ignore_ascii_case("objectid") {
                        if let Value::Integer(id) = value {
                            fid = Some(id);
                        }
                    } else {
                        attributes.push((name.clone(), value));
                    }
                }

                Ok(Feature {
                    geometry,
                    attributes,
                    fid,
                })
            })?
            .collect::<std::result::Result<Vec<Feature>, _>>()?;

        Ok(FeatureIterator {
            features: features.into_iter(),
        })
    }

    /// The underlying connection, for raw queries.
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.conn
    }

    fn geometry_registry(&self) -> Result<HashMap<String, GeometryColumnInfo>> {
        // geodatabases without spatial tables can lack the registry table
        let mut stmt = match self.conn.prepare(
            "SELECT table_name, column_name, geometry_type, srid FROM st_geometry_columns",
        ) {
            Ok(stmt) => stmt,
            Err(_) => return Ok(HashMap::new()),
        };
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                GeometryColumnInfo {
                    column: row.get(1)?,
                    type_code: row.get(2)?,
                    srid: row.get(3)?,
                },
            ))
        })?;
        let mut registry = HashMap::new();
        for row in rows {
            let (table, info) = row?;
            registry.insert(table, info);
        }
        Ok(registry)
    }

    fn table_info(&self, name: &str, registered: Option<&GeometryColumnInfo>) -> Result<TableInfo> {
        let columns = self.column_names(name)?;
        let row_count = self.row_count(name)?;

        let mut info = TableInfo {
            name: name.to_string(),
            geometry_column: None,
            geometry_type: None,
            geometry_type_code: None,
            srid: None,
            coord_system: None,
            columns,
            row_count,
        };

        if let Some(registered) = registered {
            info.geometry_column = Some(registered.column.clone());
            info.geometry_type_code = registered.type_code;
            info.geometry_type = registered.type_code.map(|code| {
                geometry_type_name(code)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Unknown({code})"))
            });
            info.srid = registered.srid;
            info.coord_system = Some(self.coordinate_system(name)?);
        } else if let Some(shape) = info
            .columns
            .iter()
            .find(|c| c.eq_ignore_ascii_case("shape"))
            .cloned()
        {
            // tables missing from the registry still get their shape column
            info.geometry_column = Some(shape);
            info.coord_system = Some(self.coordinate_system(name)?);
        }

        Ok(info)
    }

    fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let query = format!("SELECT name FROM pragma_table_info('{table}')");
        let mut stmt = self.conn.prepare(&query)?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(columns)
    }

    fn row_count(&self, table: &str) -> Result<u64> {
        let query = format!(r#"SELECT COUNT(*) FROM "{table}""#);
        let count: i64 = self.conn.query_row(&query, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Pull the coordinate system out of the table's GDB_Items definition
    /// XML, falling back to Web Mercator defaults when absent.
    fn coordinate_system(&self, table: &str) -> Result<CoordinateSystem> {
        let mut stmt = self
            .conn
            .prepare("SELECT Definition FROM GDB_Items WHERE Name = ?1")?;

        // items are registered either with or without the 'main.' prefix
        for name in [format!("main.{table}"), table.to_string()] {
            let mut rows = stmt.query([&name])?;
            if let Some(row) = rows.next()? {
                if let Some(xml) = row.get::<_, Option<String>>(0)? {
                    return Ok(coordinate_system_from_xml(&xml));
                }
            }
        }
        Ok(CoordinateSystem::default())
    }
}

/// Extract coordinate system parameters from a definition XML fragment.
///
/// The definition is a large ArcGIS XML document; only a handful of scalar
/// tags matter here, so they are pulled out with regular expressions
/// instead of a full XML parse.
pub(crate) fn coordinate_system_from_xml(xml: &str) -> CoordinateSystem {
    let defaults = CoordinateSystem::default();

    let srid = xml_capture(xml, r"<WKID>(\d+)</WKID>").and_then(|v| v.parse::<i64>().ok());
    let wkt = xml_capture(xml, r"<WKT>([^<]+)</WKT>");

    CoordinateSystem {
        x_origin: xml_number(xml, "XOrigin").unwrap_or(defaults.x_origin),
        y_origin: xml_number(xml, "YOrigin").unwrap_or(defaults.y_origin),
        xy_scale: xml_number(xml, "XYScale").unwrap_or(defaults.xy_scale),
        z_origin: xml_number(xml, "ZOrigin").unwrap_or(defaults.z_origin),
        z_scale: xml_number(xml, "ZScale").unwrap_or(defaults.z_scale),
        srid,
        wkt,
    }
}

fn xml_capture(xml: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    Some(re.captures(xml)?.get(1)?.as_str().to_string())
}

fn xml_number(xml: &str, tag: &str) -> Option<f64> {
    xml_capture(xml, &format!("<{tag}>([^<]+)"))?.trim().parse().ok()
}

/// Information about one table in the geodatabase.
#[derive(Clone, Debug)]
pub struct TableInfo {
    pub name: String,
    /// Name of the geometry column, usually `shape`. `None` for plain
    /// attribute tables.
    pub geometry_column: Option<String>,
    /// Geometry type name from the registry code, e.g. `MultiLineStringZ`.
    pub geometry_type: Option<String>,
    pub geometry_type_code: Option<i64>,
    pub srid: Option<i64>,
    pub coord_system: Option<CoordinateSystem>,
    pub columns: Vec<String>,
    pub row_count: u64,
}

impl TableInfo {
    pub fn has_geometry(&self) -> bool {
        self.geometry_column.is_some()
    }

    /// Whether the registered geometry type carries Z values.
    pub fn has_z(&self) -> bool {
        self.geometry_type_code.is_some_and(geometry_type_has_z)
    }
}

/// A feature (row) from a geodatabase table.
#[derive(Clone, Debug)]
pub struct Feature {
    geometry: Option<Geometry>,
    attributes: Vec<(String, Value)>,
    fid: Option<i64>,
}

impl Feature {
    /// The decoded geometry, if the row had one and it decoded cleanly.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// The decoded geometry, failing with
    /// [`GeodatabaseError::MissingGeometry`] when the row's blob was NULL
    /// or did not decode.
    pub fn require_geometry(&self) -> Result<&Geometry> {
        self.geometry
            .as_ref()
            .ok_or(GeodatabaseError::MissingGeometry)
    }

    pub fn into_geometry(self) -> Option<Geometry> {
        self.geometry
    }

    /// Feature ID from the OBJECTID column.
    pub fn fid(&self) -> Option<i64> {
        self.fid
    }

    /// Attribute values in column order, geometry and OBJECTID excluded.
    pub fn attributes(&self) -> &[(String, Value)] {
        &self.attributes
    }

    /// Look up an attribute by name (case-insensitive).
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    #[cfg(test)]
    pub(crate) fn new(
        geometry: Option<Geometry>,
        attributes: Vec<(String, Value)>,
        fid: Option<i64>,
    ) -> Self {
        Self {
            geometry,
            attributes,
            fid,
        }
    }
}

/// Owned iterator over features.
pub struct FeatureIterator {
    features: std::vec::IntoIter<Feature>,
}

impl Iterator for FeatureIterator {
    type Item = Feature;

    fn next(&mut self) -> Option<Self::Item> {
        self.features.next()
    }
}

/// Options for [`GeoDatabase::read_table_with`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadOptions<'a> {
    /// Attribute columns to include; `None` selects all.
    pub columns: Option<&'a [&'a str]>,
    /// SQL WHERE clause without the `WHERE` keyword.
    pub where_clause: Option<&'a str>,
    /// Maximum number of features to return.
    pub limit: Option<u32>,
}
