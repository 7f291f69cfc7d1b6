//! The polygon scoping a survey

use geo::algorithm::line_intersection::line_intersection;
use geo::{Contains, Coord, Intersects, Line, LineString, Polygon};
use serde::{Deserialize, Serialize};

use super::{BoundingBox, LatLng};
use crate::Error;
use crate::geometry::LocalFrame;

/// Closed ring of at least three distinct points.
///
/// The closing point is implicit and never stored. Rings whose edges cross
/// each other are rejected on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LatLng>", into = "Vec<LatLng>")]
pub struct StudyArea {
    ring: Vec<LatLng>,
}

impl StudyArea {
    pub fn new(ring: Vec<LatLng>) -> Result<Self, Error> {
        let mut ring = ring;
        ring.dedup();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(Error::InvalidGeometry(format!(
                "study area needs at least 3 distinct points, got {}",
                ring.len()
            )));
        }

        let frame = LocalFrame::around(&ring)
            .ok_or_else(|| Error::InvalidGeometry("empty study area".to_string()))?;
        let local: Vec<Coord<f64>> = ring.iter().map(|p| frame.to_local(*p)).collect();

        // A symmetric bow-tie has zero signed area, so crossings go first
        if has_crossing_edges(&local) {
            return Err(Error::SelfIntersecting);
        }
        if signed_area(&local).abs() < 1e-6 {
            return Err(Error::InvalidGeometry(
                "study area has no interior".to_string(),
            ));
        }

        Ok(Self { ring })
    }

    pub fn ring(&self) -> &[LatLng] {
        &self.ring
    }

    pub fn bounding_box(&self) -> BoundingBox {
        // Construction guarantees a non-empty ring
        BoundingBox::from_points(&self.ring).unwrap_or(BoundingBox {
            south: 0.0,
            west: 0.0,
            north: 0.0,
            east: 0.0,
        })
    }

    /// Local metric frame centred on the ring
    pub fn frame(&self) -> LocalFrame {
        LocalFrame::new(self.bounding_box().center())
    }

    /// Point-in-polygon test, boundary inclusive
    pub fn contains(&self, point: LatLng) -> bool {
        self.to_polygon().intersects(&point.to_point())
    }

    /// Point-in-polygon test, boundary exclusive
    pub fn contains_strictly(&self, point: LatLng) -> bool {
        self.to_polygon().contains(&point.to_point())
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        let exterior: LineString<f64> = self.ring.iter().map(|p| Coord::from(*p)).collect();
        Polygon::new(exterior, vec![])
    }

    /// Ring edges in order, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = (LatLng, LatLng)> + '_ {
        let n = self.ring.len();
        (0..n).map(move |i| (self.ring[i], self.ring[(i + 1) % n]))
    }
}

impl TryFrom<Vec<LatLng>> for StudyArea {
    type Error = Error;

    fn try_from(value: Vec<LatLng>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StudyArea> for Vec<LatLng> {
    fn from(value: StudyArea) -> Self {
        value.ring
    }
}

fn signed_area(ring: &[Coord<f64>]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

fn has_crossing_edges(ring: &[Coord<f64>]) -> bool {
    let n = ring.len();
    let edge = |i: usize| Line::new(ring[i], ring[(i + 1) % n]);
    for i in 0..n {
        for j in (i + 2)..n {
            // First and last edges share the closing vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            if line_intersection(edge(i), edge(j)).is_some() {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<LatLng> {
        vec![
            LatLng::new(52.0, 13.0),
            LatLng::new(52.0, 13.01),
            LatLng::new(52.01, 13.01),
            LatLng::new(52.01, 13.0),
        ]
    }

    #[test]
    fn explicit_closing_point_is_dropped() {
        let mut ring = square();
        ring.push(ring[0]);
        let area = StudyArea::new(ring).unwrap();
        assert_eq!(area.ring().len(), 4);
        assert_eq!(area.edges().count(), 4);
    }

    #[test]
    fn rejects_too_few_points() {
        let ring = vec![LatLng::new(52.0, 13.0), LatLng::new(52.0, 13.01)];
        assert!(matches!(
            StudyArea::new(ring),
            Err(Error::InvalidGeometry(_))
        ));
    }

    #[test]
    fn rejects_collinear_ring() {
        let ring = vec![
            LatLng::new(52.0, 13.0),
            LatLng::new(52.0, 13.01),
            LatLng::new(52.0, 13.02),
        ];
        assert!(StudyArea::new(ring).is_err());
    }

    #[test]
    fn rejects_bow_tie() {
        let ring = vec![
            LatLng::new(52.0, 13.0),
            LatLng::new(52.01, 13.01),
            LatLng::new(52.0, 13.01),
            LatLng::new(52.01, 13.0),
        ];
        assert!(matches!(StudyArea::new(ring), Err(Error::SelfIntersecting)));
    }

    #[test]
    fn containment_boundary_semantics() {
        let area = StudyArea::new(square()).unwrap();
        let inside = LatLng::new(52.005, 13.005);
        let on_edge = LatLng::new(52.0, 13.005);
        let outside = LatLng::new(52.02, 13.005);

        assert!(area.contains(inside));
        assert!(area.contains_strictly(inside));
        assert!(area.contains(on_edge));
        assert!(!area.contains_strictly(on_edge));
        assert!(!area.contains(outside));
    }

    #[test]
    fn deserializing_validates_the_ring() {
        let json = serde_json::to_string(&square()).unwrap();
        let area: StudyArea = serde_json::from_str(&json).unwrap();
        assert_eq!(area.ring(), square().as_slice());

        let bad = serde_json::to_string(&square()[..2]).unwrap();
        assert!(serde_json::from_str::<StudyArea>(&bad).is_err());
    }
}
