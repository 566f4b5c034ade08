//! Decoder for the ST_Geometry blob format used in Esri Mobile
//! Geodatabases.
//!
//! The format is reverse-engineered. The facts that matter:
//!
//! - coordinates are base-128 varints, either absolute raw values or
//!   zigzag-encoded deltas against the running coordinate
//! - raw XY values encode at twice the scale the table metadata declares
//! - absolute values sit far above [`COORD_THRESHOLD`] in the supported
//!   CRS families, metadata varints far below it; the threshold separates
//!   the two
//! - a new part starts where two absolute pairs appear in a row
//!
//! Delta accumulation happens in the signed 64-bit integer domain and is
//! converted to real units only when a coordinate is emitted; accumulating
//! in floating point would drift.

use crate::crs::CoordinateSystem;
use crate::error::DecodeError;
use crate::geometry::{
    Coord, Geometry, LineString, MultiLineString, MultiPoint, Point, Polygon,
};
use crate::varint::{zigzag_decode, VarintReader};

/// Magic header of every ST_Geometry blob.
pub const MAGIC: [u8; 4] = [0x64, 0x11, 0x0F, 0x00];

/// Raw values at or above this are absolute coordinates; below it they are
/// part metadata or deltas. Valid for Web Mercator and similar CRS
/// families, where absolute raw coordinates run from roughly 100 to 800
/// billion. Other CRS families may need a different threshold; see
/// [`StGeometryDecoder::with_coord_threshold`].
pub const COORD_THRESHOLD: u64 = 100_000_000_000;

const HAS_Z_FLAG: u64 = 0x40;

/// Cap on part-info varints before giving up on finding a coordinate.
const PART_INFO_LIMIT: usize = 10_000;

/// Shape selector from the lower four bits of the geometry flags.
///
/// Whether a polyline is a single line string or a multi, and whether a
/// polygon has holes, is decided after segmentation by counting parts, not
/// from any flag bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShapeKind {
    Point,
    MultiPoint,
    Polyline,
    Polygon,
}

impl ShapeKind {
    fn from_flags(flags: u64) -> Result<Self, DecodeError> {
        match flags & 0x0F {
            1 => Ok(Self::Point),
            2 => Ok(Self::MultiPoint),
            4 => Ok(Self::Polyline),
            8 => Ok(Self::Polygon),
            _ => Err(DecodeError::UnsupportedGeometryKind(flags)),
        }
    }
}

/// Decoder for ST_Geometry blobs from one geometry table.
///
/// Holds the table's [`CoordinateSystem`] and no other state; decoding is a
/// pure function of the blob bytes, so one decoder can serve any number of
/// parallel decode calls.
///
/// Example:
/// ```
/// use mobile_geodatabase::{CoordinateSystem, Geometry, StGeometryDecoder};
///
/// let cs = CoordinateSystem::new(-20037700.0, -30241100.0, 10000.0);
/// let decoder = StGeometryDecoder::new(cs);
/// let blob: &[u8] = &[
///     0x64, 0x11, 0x0F, 0x00, 0x01, 0x00, 0x00, 0x00, 0x04, 0x01, 0x0C,
///     0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x81, 0xE8, 0x8C, 0xFA,
///     0x80, 0x04, 0xA2, 0xCB, 0xB9, 0xC0, 0x89, 0x15,
/// ];
/// let geometry = decoder.decode(blob)?;
/// assert!(matches!(geometry, Geometry::Point(_)));
/// # Ok::<(), mobile_geodatabase::DecodeError>(())
/// ```
#[derive(Clone, Debug)]
pub struct StGeometryDecoder {
    cs: CoordinateSystem,
    coord_threshold: u64,
    strict: bool,
}

impl StGeometryDecoder {
    pub fn new(cs: CoordinateSystem) -> Self {
        Self {
            cs,
            coord_threshold: COORD_THRESHOLD,
            strict: false,
        }
    }

    /// Override the absolute-coordinate threshold for CRS families whose
    /// raw coordinates do not sit above the default.
    pub fn with_coord_threshold(mut self, threshold: u64) -> Self {
        self.coord_threshold = threshold;
        self
    }

    /// Fail with [`DecodeError::TrailingBytes`] when bytes remain after the
    /// geometry. Off by default; observed blobs occasionally pad.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn coordinate_system(&self) -> &CoordinateSystem {
        &self.cs
    }

    /// Decode one blob into a geometry value.
    ///
    /// The result owns its data and does not alias `blob`.
    pub fn decode(&self, blob: &[u8]) -> Result<Geometry, DecodeError> {
        let mut reader = VarintReader::new(blob);
        reader.read_tag(&MAGIC)?;
        let point_count = reader.read_u32_le()? as usize;
        if point_count == 0 {
            return Err(DecodeError::EmptyGeometry);
        }

        // size hint; advisory, not trusted for lengths
        reader.read_varint()?;
        let flags = reader.read_varint()?;
        let shape = ShapeKind::from_flags(flags)?;
        let has_z = flags & HAS_Z_FLAG != 0;

        let geometry = match shape {
            ShapeKind::Point => self.decode_point(&mut reader, has_z)?,
            _ => self.decode_parts(&mut reader, shape, point_count, has_z)?,
        };

        if self.strict && reader.remaining() > 0 {
            return Err(DecodeError::TrailingBytes(reader.remaining()));
        }
        Ok(geometry)
    }

    /// Skip the run of small varints ahead of the coordinates and return
    /// the first absolute value.
    ///
    /// Point blobs carry a short fixed pad here, line and polygon blobs a
    /// variable part-info region whose interpretation is partially unknown.
    /// Both consist of values far below the threshold, so one rule covers
    /// them: discard until a value at or above the threshold appears.
    fn read_first_absolute(&self, reader: &mut VarintReader<'_>) -> Result<u64, DecodeError> {
        let mut skipped = 0usize;
        loop {
            if reader.remaining() == 0 {
                return Err(DecodeError::InvalidCoordinateStream);
            }
            let value = reader.read_varint()?;
            if value >= self.coord_threshold {
                return Ok(value);
            }
            skipped += 1;
            if skipped > PART_INFO_LIMIT {
                return Err(DecodeError::InvalidCoordinateStream);
            }
        }
    }

    fn decode_point(
        &self,
        reader: &mut VarintReader<'_>,
        has_z: bool,
    ) -> Result<Geometry, DecodeError> {
        let raw_x = self.read_first_absolute(reader)? as i64;
        let raw_y = reader.read_varint()? as i64;
        let (x, y) = self.cs.raw_to_xy(raw_x, raw_y);
        let point = if has_z {
            let raw_z = reader.read_varint().map_err(z_truncation)? as i64;
            Point::with_z(x, y, self.cs.raw_to_z(raw_z))
        } else {
            Point::new(x, y)
        };
        Ok(Geometry::Point(point))
    }

    fn decode_parts(
        &self,
        reader: &mut VarintReader<'_>,
        shape: ShapeKind,
        point_count: usize,
        has_z: bool,
    ) -> Result<Geometry, DecodeError> {
        // bounding box (xmin, ymin, xmax, ymax): consumed but not trusted;
        // result bounds are recomputed from the decoded coordinates
        for _ in 0..4 {
            reader.read_varint()?;
        }

        let first_x = self.read_first_absolute(reader)?;
        let first_y = reader.read_varint()?;

        let mut segmenter = PartSegmenter::new(&self.cs, self.coord_threshold, first_x, first_y);
        for _ in 1..point_count {
            let v1 = reader.read_varint()?;
            let v2 = reader.read_varint()?;
            segmenter.push_pair(v1, v2);
        }
        let mut parts = segmenter.finish();

        if has_z {
            self.attach_z(reader, &mut parts)?;
        }

        Ok(match shape {
            ShapeKind::MultiPoint => {
                Geometry::MultiPoint(MultiPoint::new(parts.into_iter().flatten().collect()))
            }
            ShapeKind::Polyline => {
                if parts.len() == 1 {
                    Geometry::LineString(LineString::new(parts.remove(0)))
                } else {
                    Geometry::MultiLineString(MultiLineString::new(
                        parts.into_iter().map(LineString::new).collect(),
                    ))
                }
            }
            ShapeKind::Polygon => {
                // first ring is the exterior, any further rings are holes
                Geometry::Polygon(Polygon::new(
                    parts.into_iter().map(LineString::new).collect(),
                ))
            }
            ShapeKind::Point => unreachable!(),
        })
    }

    /// Read the trailing Z stream: one varint per point, the first an
    /// absolute raw value, the rest zigzag deltas. Z values attach to the
    /// points flattened across parts in emission order.
    fn attach_z(
        &self,
        reader: &mut VarintReader<'_>,
        parts: &mut [Vec<Coord>],
    ) -> Result<(), DecodeError> {
        let mut curr_z: i64 = 0;
        let mut first = true;
        for coord in parts.iter_mut().flatten() {
            let value = reader.read_varint().map_err(z_truncation)?;
            if first {
                curr_z = value as i64;
                first = false;
            } else {
                curr_z += zigzag_decode(value);
            }
            coord.z = Some(self.cs.raw_to_z(curr_z));
        }
        Ok(())
    }
}

fn z_truncation(err: DecodeError) -> DecodeError {
    match err {
        DecodeError::Truncated => DecodeError::TruncatedZStream,
        other => other,
    }
}

/// Convenience wrapper decoding one blob with the given coordinate system.
pub fn decode_geometry(blob: &[u8], cs: &CoordinateSystem) -> Result<Geometry, DecodeError> {
    StGeometryDecoder::new(cs.clone()).decode(blob)
}

/// Splits the coordinate pair stream into parts.
///
/// State machine over raw integer pairs. A pair whose first value reaches
/// the threshold is absolute and replaces the running coordinate; any other
/// pair is a zigzag delta added to it. An absolute pair directly after
/// another absolute pair closes the current part and opens the next one; an
/// absolute pair after a delta is only a jump too large to encode as a
/// delta and stays in the current part. The first coordinate of the blob
/// counts as absolute.
struct PartSegmenter<'a> {
    cs: &'a CoordinateSystem,
    threshold: u64,
    curr_x: i64,
    curr_y: i64,
    prev_was_absolute: bool,
    current: Vec<Coord>,
    parts: Vec<Vec<Coord>>,
}

impl<'a> PartSegmenter<'a> {
    fn new(cs: &'a CoordinateSystem, threshold: u64, first_x: u64, first_y: u64) -> Self {
        let curr_x = first_x as i64;
        let curr_y = first_y as i64;
        let (x, y) = cs.raw_to_xy(curr_x, curr_y);
        Self {
            cs,
            threshold,
            curr_x,
            curr_y,
            prev_was_absolute: true,
            current: vec![Coord::new(x, y)],
            parts: Vec::new(),
        }
    }

    fn push_pair(&mut self, v1: u64, v2: u64) {
        if v1 >= self.threshold {
            self.curr_x = v1 as i64;
            self.curr_y = v2 as i64;
            if self.prev_was_absolute {
                // two absolutes in a row: a new part starts here
                self.parts.push(std::mem::take(&mut self.current));
            }
            self.prev_was_absolute = true;
        } else {
            self.curr_x += zigzag_decode(v1);
            self.curr_y += zigzag_decode(v2);
            self.prev_was_absolute = false;
        }
        let (x, y) = self.cs.raw_to_xy(self.curr_x, self.curr_y);
        self.current.push(Coord::new(x, y));
    }

    fn finish(mut self) -> Vec<Vec<Coord>> {
        if !self.current.is_empty() {
            self.parts.push(self.current);
        }
        self.parts
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_geometry, StGeometryDecoder, COORD_THRESHOLD, MAGIC};
    use crate::crs::CoordinateSystem;
    use crate::error::DecodeError;
    use crate::geometry::Geometry;
    use crate::testing::BlobBuilder;

    /// Origin at zero, effective scale 20000: one real unit is 20000 raw.
    fn test_cs() -> CoordinateSystem {
        CoordinateSystem::new(0.0, 0.0, 10_000.0)
    }

    /// Raw value for a real coordinate under `test_cs`.
    fn raw(real: f64) -> u64 {
        (real * 20_000.0) as u64
    }

    const FLAGS_POLYLINE: u64 = 4;
    const FLAGS_POLYGON: u64 = 8;
    const FLAGS_MULTIPOINT: u64 = 2;

    #[test]
    fn decodes_known_point_blob() -> Result<(), DecodeError> {
        // captured from a real Mobile Geodatabase shape column
        let blob: &[u8] = &[
            0x64, 0x11, 0x0F, 0x00, 0x01, 0x00, 0x00, 0x00, 0x04, 0x01, 0x0C, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00, 0x81, 0xE8, 0x8C, 0xFA, 0x80, 0x04, 0xA2, 0xCB, 0xB9, 0xC0,
            0x89, 0x15,
        ];
        let cs = CoordinateSystem::new(-20_037_700.0, -30_241_100.0, 10_000.0);
        let geometry = decode_geometry(blob, &cs)?;
        let Geometry::Point(point) = &geometry else {
            panic!("expected a point, got {geometry:?}");
        };
        assert!((point.x - -13_152_949.20).abs() < 0.01);
        assert!((point.y - 5_964_179.30).abs() < 0.01);
        assert!(!point.has_z());
        Ok(())
    }

    #[test]
    fn rejects_bad_magic() {
        let blob = [0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
        assert_eq!(
            decode_geometry(&blob, &test_cs()),
            Err(DecodeError::BadMagic)
        );
    }

    #[test]
    fn rejects_short_blob() {
        assert_eq!(
            decode_geometry(&MAGIC[..3], &test_cs()),
            Err(DecodeError::Truncated)
        );
    }

    #[test]
    fn rejects_empty_geometry() {
        let blob = BlobBuilder::new(0).header(0, FLAGS_POLYLINE).build();
        assert_eq!(
            decode_geometry(&blob, &test_cs()),
            Err(DecodeError::EmptyGeometry)
        );
    }

    #[test]
    fn rejects_unknown_shape() {
        let blob = BlobBuilder::new(1).header(0, 3).build();
        assert_eq!(
            decode_geometry(&blob, &test_cs()),
            Err(DecodeError::UnsupportedGeometryKind(3))
        );
    }

    #[test]
    fn decodes_point_with_z() -> Result<(), DecodeError> {
        let blob = BlobBuilder::new(1)
            .header(0, 1 | 0x40)
            .varint(raw(10_000_000.0))
            .varint(raw(12_000_000.0))
            // raw z at the default z origin/scale: 1_001_000_000 -> 100.0
            .varint(1_001_000_000)
            .build();
        let geometry = decode_geometry(&blob, &test_cs())?;
        let Geometry::Point(point) = &geometry else {
            panic!("expected a point");
        };
        assert!((point.x - 10_000_000.0).abs() < 1e-9);
        assert!((point.y - 12_000_000.0).abs() < 1e-9);
        assert!((point.z.expect("z value") - 100.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn point_coordinates_follow_pad_varints() -> Result<(), DecodeError> {
        let blob = BlobBuilder::new(1)
            .header(12, 1)
            .varint(0)
            .varint(0)
            .varint(1)
            .varint(0)
            .varint(raw(10_000_000.0))
            .varint(raw(12_000_000.0))
            .build();
        let geometry = decode_geometry(&blob, &test_cs())?;
        let Geometry::Point(point) = &geometry else {
            panic!("expected a point");
        };
        assert!((point.x - 10_000_000.0).abs() < 1e-9);
        assert!((point.y - 12_000_000.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn decodes_two_point_line_with_delta() -> Result<(), DecodeError> {
        let blob = BlobBuilder::new(2)
            .header(0, FLAGS_POLYLINE)
            .bbox(raw(10_000_000.0), raw(10_000_000.0), raw(10_000_001.0), raw(10_000_001.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(20_000, 20_000)
            .build();
        let geometry = decode_geometry(&blob, &test_cs())?;
        let Geometry::LineString(line) = &geometry else {
            panic!("expected a line string, got {geometry:?}");
        };
        assert_eq!(line.len(), 2);
        let [first, second] = line.points() else {
            panic!("expected two points");
        };
        assert!((second.x - first.x - 1.0).abs() < 1e-9);
        assert!((second.y - first.y - 1.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn skips_part_info_before_first_coordinate() -> Result<(), DecodeError> {
        let blob = BlobBuilder::new(2)
            .header(0, FLAGS_POLYLINE)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .varint(1)
            .varint(0)
            .varint(24)
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(-20_000, 40_000)
            .build();
        let geometry = decode_geometry(&blob, &test_cs())?;
        let Geometry::LineString(line) = &geometry else {
            panic!("expected a line string");
        };
        assert_eq!(line.len(), 2);
        assert!((line.points()[1].x - 9_999_999.0).abs() < 1e-6);
        assert!((line.points()[1].y - 10_000_002.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn consecutive_absolutes_split_parts() -> Result<(), DecodeError> {
        // delta, absolute (jump), absolute (boundary), delta
        let blob = BlobBuilder::new(5)
            .header(0, FLAGS_POLYLINE)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(20_000, 20_000)
            .absolute_pair(raw(12_000_000.0), raw(12_000_000.0))
            .absolute_pair(raw(15_000_000.0), raw(15_000_000.0))
            .delta_pair(20_000, 20_000)
            .build();
        let geometry = decode_geometry(&blob, &test_cs())?;
        let Geometry::MultiLineString(multi) = &geometry else {
            panic!("expected a multi line string, got {geometry:?}");
        };
        assert_eq!(multi.len(), 2);
        assert_eq!(multi.lines()[0].len(), 3);
        assert_eq!(multi.lines()[1].len(), 2);
        // the part boundary point carries the absolute raw value exactly
        assert!((multi.lines()[1].points()[0].x - 15_000_000.0).abs() < 1e-9);
        assert_eq!(geometry.num_points(), 5);
        Ok(())
    }

    #[test]
    fn lone_absolute_is_a_jump_not_a_boundary() -> Result<(), DecodeError> {
        // delta, absolute, delta: stays a single part
        let blob = BlobBuilder::new(4)
            .header(0, FLAGS_POLYLINE)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(20_000, 20_000)
            .absolute_pair(raw(14_000_000.0), raw(14_000_000.0))
            .delta_pair(-20_000, -20_000)
            .build();
        let geometry = decode_geometry(&blob, &test_cs())?;
        let Geometry::LineString(line) = &geometry else {
            panic!("expected a single line string, got {geometry:?}");
        };
        assert_eq!(line.len(), 4);
        assert!((line.points()[2].x - 14_000_000.0).abs() < 1e-9);
        assert!((line.points()[3].x - 13_999_999.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn two_point_trailing_absolute_splits() -> Result<(), DecodeError> {
        // the literal consecutive-absolute rule: the first blob coordinate
        // counts as absolute, so a trailing absolute yields two 1-point
        // parts; downstream consumers must tolerate them
        let blob = BlobBuilder::new(2)
            .header(0, FLAGS_POLYLINE)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .absolute_pair(raw(14_000_000.0), raw(14_000_000.0))
            .build();
        let geometry = decode_geometry(&blob, &test_cs())?;
        let Geometry::MultiLineString(multi) = &geometry else {
            panic!("expected two parts, got {geometry:?}");
        };
        assert_eq!(multi.len(), 2);
        assert_eq!(multi.lines()[0].len(), 1);
        assert_eq!(multi.lines()[1].len(), 1);
        Ok(())
    }

    #[test]
    fn threshold_is_inclusive_on_the_absolute_side() -> Result<(), DecodeError> {
        let blob = BlobBuilder::new(2)
            .header(0, FLAGS_POLYLINE)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .absolute_pair(COORD_THRESHOLD, COORD_THRESHOLD)
            .build();
        let geometry = decode_geometry(&blob, &test_cs())?;
        let Geometry::MultiLineString(multi) = &geometry else {
            panic!("expected the threshold value to read as absolute");
        };
        assert_eq!(multi.len(), 2);
        assert!((multi.lines()[1].points()[0].x - 5_000_000.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn single_ring_polygon() -> Result<(), DecodeError> {
        let blob = BlobBuilder::new(4)
            .header(0, FLAGS_POLYGON)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(20_000, 0)
            .delta_pair(0, 20_000)
            .delta_pair(-20_000, -20_000)
            .build();
        let geometry = decode_geometry(&blob, &test_cs())?;
        let Geometry::Polygon(polygon) = &geometry else {
            panic!("expected a polygon, got {geometry:?}");
        };
        assert_eq!(polygon.rings().len(), 1);
        assert!(polygon.interiors().is_empty());
        let ring = polygon.exterior().expect("exterior ring");
        assert_eq!(ring.points()[0], ring.points()[3]);
        Ok(())
    }

    #[test]
    fn polygon_z_with_hole() -> Result<(), DecodeError> {
        // polygon + Z flag; ring 2 opens at the consecutive absolutes
        let blob = BlobBuilder::new(7)
            .header(0, FLAGS_POLYGON | 0x40)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(20_000, 0)
            .delta_pair(0, 20_000)
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .absolute_pair(raw(10_000_000.2), raw(10_000_000.2))
            .delta_pair(2_000, 0)
            .delta_pair(-2_000, -2_000)
            // z tail: absolute first, zigzag deltas after
            .varint(1_001_000_000)
            .zigzag(10_000)
            .zigzag(10_000)
            .zigzag(10_000)
            .zigzag(10_000)
            .zigzag(10_000)
            .zigzag(10_000)
            .build();
        let geometry = decode_geometry(&blob, &test_cs())?;
        let Geometry::Polygon(polygon) = &geometry else {
            panic!("expected a polygon, got {geometry:?}");
        };
        assert!(polygon.has_z());
        assert_eq!(polygon.rings().len(), 2);
        assert_eq!(polygon.rings()[0].len(), 4);
        assert_eq!(polygon.rings()[1].len(), 3);
        let first_z = polygon.rings()[0].points()[0].z.expect("z");
        let last_z = polygon.rings()[1].points()[2].z.expect("z");
        assert!((first_z - 100.0).abs() < 1e-9);
        // six +1.0 deltas accumulate onto the absolute start
        assert!((last_z - 106.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn multipoint_flattens_absolute_only_pairs() -> Result<(), DecodeError> {
        let blob = BlobBuilder::new(3)
            .header(0, FLAGS_MULTIPOINT)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10.0), raw(10.0))
            .absolute_pair(raw(20.0), raw(20.0))
            .absolute_pair(raw(30.0), raw(30.0))
            .build();
        // raw(10.0) etc. fall below the default threshold; lower it so small
        // test coordinates still read as absolute
        let decoder = StGeometryDecoder::new(test_cs()).with_coord_threshold(raw(5.0));
        let geometry = decoder.decode(&blob)?;
        let Geometry::MultiPoint(points) = &geometry else {
            panic!("expected a multipoint, got {geometry:?}");
        };
        assert_eq!(points.len(), 3);
        assert!((points.points()[2].x - 30.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn z_stream_shorter_than_points_fails() {
        let blob = BlobBuilder::new(3)
            .header(0, FLAGS_POLYLINE | 0x40)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(20_000, 20_000)
            .delta_pair(20_000, 20_000)
            .varint(1_001_000_000)
            .zigzag(10_000)
            .build();
        assert_eq!(
            decode_geometry(&blob, &test_cs()),
            Err(DecodeError::TruncatedZStream)
        );
    }

    #[test]
    fn missing_coordinate_start_fails() {
        let blob = BlobBuilder::new(2)
            .header(0, FLAGS_POLYLINE)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .varint(1)
            .varint(2)
            .varint(3)
            .build();
        assert_eq!(
            decode_geometry(&blob, &test_cs()),
            Err(DecodeError::InvalidCoordinateStream)
        );
    }

    #[test]
    fn truncated_pair_stream_fails() {
        let blob = BlobBuilder::new(3)
            .header(0, FLAGS_POLYLINE)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(20_000, 20_000)
            .build();
        assert_eq!(
            decode_geometry(&blob, &test_cs()),
            Err(DecodeError::Truncated)
        );
    }

    #[test]
    fn trailing_bytes_only_fail_in_strict_mode() -> Result<(), DecodeError> {
        let mut blob = BlobBuilder::new(2)
            .header(0, FLAGS_POLYLINE)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(20_000, 20_000)
            .build();
        blob.extend_from_slice(&[0x00, 0x00]);

        decode_geometry(&blob, &test_cs())?;

        let strict = StGeometryDecoder::new(test_cs()).with_strict(true);
        assert_eq!(strict.decode(&blob), Err(DecodeError::TrailingBytes(2)));
        Ok(())
    }

    #[test]
    fn decoding_is_pure() -> Result<(), DecodeError> {
        let blob = BlobBuilder::new(3)
            .header(0, FLAGS_POLYLINE)
            .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(20_000, -20_000)
            .delta_pair(-40_000, 60_000)
            .build();
        let decoder = StGeometryDecoder::new(test_cs());
        assert_eq!(decoder.decode(&blob)?, decoder.decode(&blob)?);
        Ok(())
    }

    #[test]
    fn point_total_matches_header_count() -> Result<(), DecodeError> {
        for count in [1usize, 2, 5, 9] {
            let mut builder = BlobBuilder::new(count as u32)
                .header(0, FLAGS_POLYLINE)
                .bbox(raw(1.0), raw(1.0), raw(2.0), raw(2.0))
                .absolute_pair(raw(10_000_000.0), raw(10_000_000.0));
            for i in 1..count {
                builder = if i % 3 == 0 {
                    builder.absolute_pair(raw(12_000_000.0), raw(12_000_000.0))
                } else {
                    builder.delta_pair(20_000, 20_000)
                };
            }
            let geometry = decode_geometry(&builder.build(), &test_cs())?;
            assert_eq!(geometry.num_points(), count);
        }
        Ok(())
    }

    #[test]
    fn bounds_contain_all_decoded_points() -> Result<(), DecodeError> {
        // the stored bounding box is garbage on purpose; bounds come from
        // the coordinates themselves
        let blob = BlobBuilder::new(3)
            .header(0, FLAGS_POLYLINE)
            .bbox(
                COORD_THRESHOLD,
                COORD_THRESHOLD,
                COORD_THRESHOLD,
                COORD_THRESHOLD,
            )
            .absolute_pair(raw(10_000_000.0), raw(10_000_000.0))
            .delta_pair(-200_000, 100_000)
            .delta_pair(400_000, -300_000)
            .build();
        let geometry = decode_geometry(&blob, &test_cs())?;
        let bounds = geometry.bounds().expect("bounds");
        let Geometry::LineString(line) = &geometry else {
            panic!("expected a line string");
        };
        for coord in line.points() {
            assert!(bounds.contains(coord));
        }
        Ok(())
    }
}
