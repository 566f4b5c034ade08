/// Map an Esri geometry type code from `st_geometry_columns.geometry_type`
/// to its name. Z variants add 1000; 2005 is an alternative code for
/// MultiLineStringZ seen in practice.
#[inline]
pub(crate) fn geometry_type_name(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Point"),
        2 => Some("LineString"),
        3 => Some("Polygon"),
        4 => Some("MultiPoint"),
        5 => Some("MultiLineString"),
        6 => Some("MultiPolygon"),
        1001 => Some("PointZ"),
        1002 => Some("LineStringZ"),
        1003 => Some("PolygonZ"),
        1004 => Some("MultiPointZ"),
        1005 | 2005 => Some("MultiLineStringZ"),
        1006 => Some("MultiPolygonZ"),
        _ => None,
    }
}

#[inline]
pub(crate) fn geometry_type_has_z(code: i64) -> bool {
    matches!(code, 1001..=1006 | 2005)
}
