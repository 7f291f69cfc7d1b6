//! Geographic coordinates and line geometry
//!
//! `LatLng` is the only coordinate type used internally. Conversions to the
//! x/y ordered `geo` types happen through the `From` impls below.

use geo::{Coord, LineString, Point};
use serde::{Deserialize, Serialize};

use crate::geometry::line_length;

/// WGS84 coordinate with named fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

impl From<LatLng> for Coord<f64> {
    fn from(value: LatLng) -> Self {
        Coord {
            x: value.lng,
            y: value.lat,
        }
    }
}

impl From<Coord<f64>> for LatLng {
    fn from(value: Coord<f64>) -> Self {
        Self {
            lat: value.y,
            lng: value.x,
        }
    }
}

impl From<Point<f64>> for LatLng {
    fn from(value: Point<f64>) -> Self {
        Self {
            lat: value.y(),
            lng: value.x(),
        }
    }
}

/// Ordered line geometry. Point order defines the path direction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline(Vec<LatLng>);

impl Polyline {
    pub fn new(points: Vec<LatLng>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[LatLng] {
        &self.0
    }

    pub fn into_points(self) -> Vec<LatLng> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<LatLng> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<LatLng> {
        self.0.last().copied()
    }

    pub fn reversed(&self) -> Self {
        Self(self.0.iter().rev().copied().collect())
    }

    /// Haversine length in metres
    pub fn length_m(&self) -> f64 {
        line_length(self)
    }

    /// At least two points and a non-zero length
    pub fn is_valid(&self) -> bool {
        self.0.len() >= 2 && self.length_m() > 0.0
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.0)
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        self.0.iter().map(|p| Coord::from(*p)).collect()
    }
}

impl FromIterator<LatLng> for Polyline {
    fn from_iter<I: IntoIterator<Item = LatLng>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<LatLng>> for Polyline {
    fn from(value: Vec<LatLng>) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let init = Self {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        Some(points.fold(init, |bbox, p| Self {
            south: bbox.south.min(p.lat),
            west: bbox.west.min(p.lng),
            north: bbox.north.max(p.lat),
            east: bbox.east.max(p.lng),
        }))
    }

    /// Identity used for road-data invalidation: extents equal to 1e-6 degrees
    pub fn same_extent(&self, other: &Self) -> bool {
        fn key(value: f64) -> i64 {
            #[allow(clippy::cast_possible_truncation)]
            let rounded = (value * 1e6).round() as i64;
            rounded
        }
        key(self.south) == key(other.south)
            && key(self.west) == key(other.west)
            && key(self.north) == key(other.north)
            && key(self.east) == key(other.east)
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}
