//! In-memory geometry model produced by the decoder.
//!
//! A closed set of variants rather than a trait hierarchy: exporters and
//! other consumers dispatch on the [`Geometry`] tag. Containers cache their
//! bounding box and Z-ness at construction, so the decoder computes them
//! once and accessors stay cheap.

/// A single 2D or 3D coordinate in real-world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

/// Axis-aligned bounding box in the XY plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Fold a coordinate sequence into its bounds. `None` when empty.
    pub fn from_coords<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coord>,
    {
        let mut bounds: Option<Self> = None;
        for coord in coords {
            match &mut bounds {
                Some(existing) => existing.expand(coord),
                None => {
                    bounds = Some(Self {
                        xmin: coord.x,
                        ymin: coord.y,
                        xmax: coord.x,
                        ymax: coord.y,
                    });
                }
            }
        }
        bounds
    }

    fn expand(&mut self, coord: &Coord) {
        self.xmin = self.xmin.min(coord.x);
        self.ymin = self.ymin.min(coord.y);
        self.xmax = self.xmax.max(coord.x);
        self.ymax = self.ymax.max(coord.y);
    }

    fn merge(bounds: &mut Option<Self>, other: Option<Self>) {
        match (bounds.as_mut(), other) {
            (Some(existing), Some(other)) => {
                existing.xmin = existing.xmin.min(other.xmin);
                existing.ymin = existing.ymin.min(other.ymin);
                existing.xmax = existing.xmax.max(other.xmax);
                existing.ymax = existing.ymax.max(other.ymax);
            }
            (None, Some(other)) => *bounds = Some(other),
            (_, None) => {}
        }
    }

    pub fn contains(&self, coord: &Coord) -> bool {
        (self.xmin..=self.xmax).contains(&coord.x) && (self.ymin..=self.ymax).contains(&coord.y)
    }
}

/// A 2D or 3D point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    pub fn has_z(&self) -> bool {
        self.z.is_some()
    }

    pub fn coord(&self) -> Coord {
        Coord {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            xmin: self.x,
            ymin: self.y,
            xmax: self.x,
            ymax: self.y,
        }
    }
}

/// An ordered run of coordinates forming one line or one polygon ring.
#[derive(Clone, Debug, PartialEq)]
pub struct LineString {
    points: Vec<Coord>,
    has_z: bool,
    bounds: Option<BoundingBox>,
}

impl LineString {
    pub fn new(points: Vec<Coord>) -> Self {
        let has_z = points.first().is_some_and(|c| c.z.is_some());
        let bounds = BoundingBox::from_coords(&points);
        Self {
            points,
            has_z,
            bounds,
        }
    }

    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_z(&self) -> bool {
        self.has_z
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }
}

/// A polygon: the first ring is the exterior, any further rings are holes.
///
/// By convention each ring's first point equals its last; the decoder does
/// not enforce or repair this.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    rings: Vec<LineString>,
    has_z: bool,
    bounds: Option<BoundingBox>,
}

impl Polygon {
    pub fn new(rings: Vec<LineString>) -> Self {
        let has_z = rings.first().is_some_and(LineString::has_z);
        let mut bounds = None;
        for ring in &rings {
            BoundingBox::merge(&mut bounds, ring.bounds());
        }
        Self {
            rings,
            has_z,
            bounds,
        }
    }

    pub fn rings(&self) -> &[LineString] {
        &self.rings
    }

    pub fn exterior(&self) -> Option<&LineString> {
        self.rings.first()
    }

    pub fn interiors(&self) -> &[LineString] {
        if self.rings.len() > 1 {
            &self.rings[1..]
        } else {
            &[]
        }
    }

    pub fn has_z(&self) -> bool {
        self.has_z
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }
}

/// An unordered set of points.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiPoint {
    points: Vec<Coord>,
    has_z: bool,
    bounds: Option<BoundingBox>,
}

impl MultiPoint {
    pub fn new(points: Vec<Coord>) -> Self {
        let has_z = points.first().is_some_and(|c| c.z.is_some());
        let bounds = BoundingBox::from_coords(&points);
        Self {
            points,
            has_z,
            bounds,
        }
    }

    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_z(&self) -> bool {
        self.has_z
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }
}

/// Multiple line strings.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiLineString {
    lines: Vec<LineString>,
    has_z: bool,
    bounds: Option<BoundingBox>,
}

impl MultiLineString {
    pub fn new(lines: Vec<LineString>) -> Self {
        let has_z = lines.first().is_some_and(LineString::has_z);
        let mut bounds = None;
        for line in &lines {
            BoundingBox::merge(&mut bounds, line.bounds());
        }
        Self {
            lines,
            has_z,
            bounds,
        }
    }

    pub fn lines(&self) -> &[LineString] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn has_z(&self) -> bool {
        self.has_z
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }
}

/// Multiple polygons.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiPolygon {
    polygons: Vec<Polygon>,
    has_z: bool,
    bounds: Option<BoundingBox>,
}

impl MultiPolygon {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let has_z = polygons.first().is_some_and(Polygon::has_z);
        let mut bounds = None;
        for polygon in &polygons {
            BoundingBox::merge(&mut bounds, polygon.bounds());
        }
        Self {
            polygons,
            has_z,
            bounds,
        }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn has_z(&self) -> bool {
        self.has_z
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }
}

/// A decoded geometry value.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::LineString(_) => "LineString",
            Self::Polygon(_) => "Polygon",
            Self::MultiPoint(_) => "MultiPoint",
            Self::MultiLineString(_) => "MultiLineString",
            Self::MultiPolygon(_) => "MultiPolygon",
        }
    }

    pub fn has_z(&self) -> bool {
        match self {
            Self::Point(g) => g.has_z(),
            Self::LineString(g) => g.has_z(),
            Self::Polygon(g) => g.has_z(),
            Self::MultiPoint(g) => g.has_z(),
            Self::MultiLineString(g) => g.has_z(),
            Self::MultiPolygon(g) => g.has_z(),
        }
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        match self {
            Self::Point(g) => Some(g.bounds()),
            Self::LineString(g) => g.bounds(),
            Self::Polygon(g) => g.bounds(),
            Self::MultiPoint(g) => g.bounds(),
            Self::MultiLineString(g) => g.bounds(),
            Self::MultiPolygon(g) => g.bounds(),
        }
    }

    /// Total number of coordinates across all parts and rings.
    pub fn num_points(&self) -> usize {
        match self {
            Self::Point(_) => 1,
            Self::LineString(g) => g.len(),
            Self::Polygon(g) => g.rings().iter().map(LineString::len).sum(),
            Self::MultiPoint(g) => g.len(),
            Self::MultiLineString(g) => g.lines().iter().map(LineString::len).sum(),
            Self::MultiPolygon(g) => g
                .polygons()
                .iter()
                .map(|p| p.rings().iter().map(LineString::len).sum::<usize>())
                .sum(),
        }
    }
}
