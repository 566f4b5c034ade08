//! geo-traits implementations for the geometry model.
//!
//! These let the model flow straight into ecosystem serializers such as
//! `wkt::to_wkt::write_geometry` and `wkb::writer::write_geometry` without
//! an intermediate copy. Dimensions are reported per value: XYZ when the
//! geometry carries Z, XY otherwise.

use crate::geometry::{
    Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
use geo_traits::{
    CoordTrait, Dimensions, GeometryCollectionTrait, GeometryTrait, GeometryType, LineStringTrait,
    MultiLineStringTrait, MultiPointTrait, MultiPolygonTrait, PointTrait, PolygonTrait,
    UnimplementedLine, UnimplementedLineString, UnimplementedMultiLineString,
    UnimplementedMultiPoint, UnimplementedMultiPolygon, UnimplementedPoint, UnimplementedPolygon,
    UnimplementedRect, UnimplementedTriangle,
};

/// An empty struct that implements [`GeometryCollectionTrait`] and [`GeometryTrait`].
///
/// `geo-traits` 0.2 does not ship an `UnimplementedGeometryCollection` (unlike its
/// `UnimplementedRect`/`UnimplementedLine`/`UnimplementedTriangle` counterparts), so this
/// mirrors that pattern locally for use as `GeometryTrait::GeometryCollectionType` since
/// [`Geometry`] never actually produces a geometry collection variant.
pub struct UnimplementedGeometryCollection<T>(std::marker::PhantomData<T>);

impl<T> GeometryCollectionTrait for UnimplementedGeometryCollection<T> {
    type T = T;
    type GeometryType<'a>
        = Self
    where
        Self: 'a;

    fn dim(&self) -> Dimensions {
        unimplemented!()
    }

    fn num_geometries(&self) -> usize {
        unimplemented!()
    }

    unsafe fn geometry_unchecked(&self, _i: usize) -> Self::GeometryType<'_> {
        unimplemented!()
    }
}

impl<T> GeometryTrait for UnimplementedGeometryCollection<T> {
    type T = T;
    type PointType<'a>
        = UnimplementedPoint<T>
    where
        Self: 'a;
    type LineStringType<'a>
        = UnimplementedLineString<T>
    where
        Self: 'a;
    type PolygonType<'a>
        = UnimplementedPolygon<T>
    where
        Self: 'a;
    type MultiPointType<'a>
        = UnimplementedMultiPoint<T>
    where
        Self: 'a;
    type MultiLineStringType<'a>
        = UnimplementedMultiLineString<T>
    where
        Self: 'a;
    type MultiPolygonType<'a>
        = UnimplementedMultiPolygon<T>
    where
        Self: 'a;
    type GeometryCollectionType<'a>
        = Self
    where
        Self: 'a;
    type RectType<'a>
        = UnimplementedRect<T>
    where
        Self: 'a;
    type TriangleType<'a>
        = UnimplementedTriangle<T>
    where
        Self: 'a;
    type LineType<'a>
        = UnimplementedLine<T>
    where
        Self: 'a;

    fn dim(&self) -> Dimensions {
        unimplemented!()
    }

    fn as_type(
        &self,
    ) -> GeometryType<
        '_,
        Self::PointType<'_>,
        Self::LineStringType<'_>,
        Self::PolygonType<'_>,
        Self::MultiPointType<'_>,
        Self::MultiLineStringType<'_>,
        Self::MultiPolygonType<'_>,
        Self::GeometryCollectionType<'_>,
        Self::RectType<'_>,
        Self::TriangleType<'_>,
        Self::LineType<'_>,
    > {
        unimplemented!()
    }
}

fn dimensions(has_z: bool) -> Dimensions {
    if has_z {
        Dimensions::Xyz
    } else {
        Dimensions::Xy
    }
}

impl CoordTrait for Coord {
    type T = f64;

    fn dim(&self) -> Dimensions {
        dimensions(self.z.is_some())
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> f64 {
        match n {
            0 => self.x,
            1 => self.y,
            2 => match self.z {
                Some(z) => z,
                None => panic!("coordinate has no z value"),
            },
            _ => panic!("coordinate index {n} out of range"),
        }
    }
}

impl PointTrait for Point {
    type T = f64;
    type CoordType<'a> = Coord where Self: 'a;

    fn dim(&self) -> Dimensions {
        dimensions(self.has_z())
    }

    fn coord(&self) -> Option<Self::CoordType<'_>> {
        Some(self.coord())
    }
}

// MultiPoint stores bare coordinates; each one acts as a point.
impl PointTrait for Coord {
    type T = f64;
    type CoordType<'a> = Coord where Self: 'a;

    fn dim(&self) -> Dimensions {
        dimensions(self.z.is_some())
    }

    fn coord(&self) -> Option<Self::CoordType<'_>> {
        Some(*self)
    }
}

impl LineStringTrait for LineString {
    type T = f64;
    type CoordType<'a> = Coord where Self: 'a;

    fn dim(&self) -> Dimensions {
        dimensions(self.has_z())
    }

    fn num_coords(&self) -> usize {
        self.len()
    }

    unsafe fn coord_unchecked(&self, i: usize) -> Self::CoordType<'_> {
        self.points()[i]
    }
}

impl LineStringTrait for &LineString {
    type T = f64;
    type CoordType<'a> = Coord where Self: 'a;

    fn dim(&self) -> Dimensions {
        dimensions(self.has_z())
    }

    fn num_coords(&self) -> usize {
        self.len()
    }

    unsafe fn coord_unchecked(&self, i: usize) -> Self::CoordType<'_> {
        self.points()[i]
    }
}

impl PolygonTrait for Polygon {
    type T = f64;
    type RingType<'a> = &'a LineString where Self: 'a;

    fn dim(&self) -> Dimensions {
        dimensions(self.has_z())
    }

    fn exterior(&self) -> Option<Self::RingType<'_>> {
        self.exterior()
    }

    fn num_interiors(&self) -> usize {
        Polygon::interiors(self).len()
    }

    unsafe fn interior_unchecked(&self, i: usize) -> Self::RingType<'_> {
        &Polygon::interiors(self)[i]
    }
}

impl PolygonTrait for &Polygon {
    type T = f64;
    type RingType<'a> = &'a LineString where Self: 'a;

    fn dim(&self) -> Dimensions {
        dimensions(self.has_z())
    }

    fn exterior(&self) -> Option<Self::RingType<'_>> {
        Polygon::exterior(self)
    }

    fn num_interiors(&self) -> usize {
        Polygon::interiors(self).len()
    }

    unsafe fn interior_unchecked(&self, i: usize) -> Self::RingType<'_> {
        &Polygon::interiors(self)[i]
    }
}

impl MultiPointTrait for MultiPoint {
    type T = f64;
    type PointType<'a> = Coord where Self: 'a;

    fn dim(&self) -> Dimensions {
        dimensions(self.has_z())
    }

    fn num_points(&self) -> usize {
        self.len()
    }

    unsafe fn point_unchecked(&self, i: usize) -> Self::PointType<'_> {
        self.points()[i]
    }
}

impl MultiLineStringTrait for MultiLineString {
    type T = f64;
    type LineStringType<'a> = &'a LineString where Self: 'a;

    fn dim(&self) -> Dimensions {
        dimensions(self.has_z())
    }

    fn num_line_strings(&self) -> usize {
        self.len()
    }

    unsafe fn line_string_unchecked(&self, i: usize) -> Self::LineStringType<'_> {
        &self.lines()[i]
    }
}

impl MultiPolygonTrait for MultiPolygon {
    type T = f64;
    type PolygonType<'a> = &'a Polygon where Self: 'a;

    fn dim(&self) -> Dimensions {
        dimensions(self.has_z())
    }

    fn num_polygons(&self) -> usize {
        self.len()
    }

    unsafe fn polygon_unchecked(&self, i: usize) -> Self::PolygonType<'_> {
        &self.polygons()[i]
    }
}

impl GeometryTrait for Geometry {
    type T = f64;
    type PointType<'a> = Point where Self: 'a;
    type LineStringType<'a> = LineString where Self: 'a;
    type PolygonType<'a> = Polygon where Self: 'a;
    type MultiPointType<'a> = MultiPoint where Self: 'a;
    type MultiLineStringType<'a> = MultiLineString where Self: 'a;
    type MultiPolygonType<'a> = MultiPolygon where Self: 'a;
    type GeometryCollectionType<'a> = UnimplementedGeometryCollection<f64> where Self: 'a;
    type RectType<'a> = UnimplementedRect<f64> where Self: 'a;
    type TriangleType<'a> = UnimplementedTriangle<f64> where Self: 'a;
    type LineType<'a> = UnimplementedLine<f64> where Self: 'a;

    fn dim(&self) -> Dimensions {
        dimensions(self.has_z())
    }

    fn as_type(
        &self,
    ) -> GeometryType<
        '_,
        Self::PointType<'_>,
        Self::LineStringType<'_>,
        Self::PolygonType<'_>,
        Self::MultiPointType<'_>,
        Self::MultiLineStringType<'_>,
        Self::MultiPolygonType<'_>,
        Self::GeometryCollectionType<'_>,
        Self::RectType<'_>,
        Self::TriangleType<'_>,
        Self::LineType<'_>,
    > {
        match self {
            Self::Point(g) => GeometryType::Point(g),
            Self::LineString(g) => GeometryType::LineString(g),
            Self::Polygon(g) => GeometryType::Polygon(g),
            Self::MultiPoint(g) => GeometryType::MultiPoint(g),
            Self::MultiLineString(g) => GeometryType::MultiLineString(g),
            Self::MultiPolygon(g) => GeometryType::MultiPolygon(g),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Coord, Geometry, LineString, Point, Polygon};
    use geo_traits::{
        CoordTrait, Dimensions, GeometryTrait, LineStringTrait, PointTrait, PolygonTrait,
    };

    #[test]
    fn coord_reports_dimensions() {
        assert_eq!(CoordTrait::dim(&Coord::new(1.0, 2.0)), Dimensions::Xy);
        assert_eq!(CoordTrait::dim(&Coord::with_z(1.0, 2.0, 3.0)), Dimensions::Xyz);
        assert_eq!(Coord::with_z(1.0, 2.0, 3.0).nth_or_panic(2), 3.0);
    }

    #[test]
    fn point_exposes_its_coordinate() {
        let point = Point::with_z(1.0, 2.0, 3.0);
        let coord = PointTrait::coord(&point).expect("coordinate");
        assert_eq!(coord.x_y(), (1.0, 2.0));
    }

    #[test]
    fn line_string_iterates_coords() {
        let line = LineString::new(vec![Coord::new(0.0, 0.0), Coord::new(1.0, 1.0)]);
        assert_eq!(LineStringTrait::num_coords(&line), 2);
        let collected: Vec<(f64, f64)> = line.coords().map(|c| c.x_y()).collect();
        assert_eq!(collected, vec![(0.0, 0.0), (1.0, 1.0)]);
    }

    #[test]
    fn polygon_exposes_rings() {
        let outer = LineString::new(vec![
            Coord::new(0.0, 0.0),
            Coord::new(4.0, 0.0),
            Coord::new(4.0, 4.0),
            Coord::new(0.0, 0.0),
        ]);
        let hole = LineString::new(vec![
            Coord::new(1.0, 1.0),
            Coord::new(2.0, 1.0),
            Coord::new(2.0, 2.0),
            Coord::new(1.0, 1.0),
        ]);
        let polygon = Polygon::new(vec![outer, hole]);
        assert!(PolygonTrait::exterior(&polygon).is_some());
        assert_eq!(PolygonTrait::num_interiors(&polygon), 1);
    }

    #[test]
    fn geometry_dim_tracks_z() {
        let flat = Geometry::Point(Point::new(1.0, 2.0));
        let with_z = Geometry::Point(Point::with_z(1.0, 2.0, 3.0));
        assert_eq!(GeometryTrait::dim(&flat), Dimensions::Xy);
        assert_eq!(GeometryTrait::dim(&with_z), Dimensions::Xyz);
    }
}
