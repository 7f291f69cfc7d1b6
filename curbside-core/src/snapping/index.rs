//! Spatial index over guide segments for nearest-guide lookups

use geo::Coord;
use rstar::primitives::{GeomWithData, Line};
use rstar::{PointDistance, RTree};

use crate::geometry::LocalFrame;
use crate::model::{GuideId, GuideLine, LatLng};
use crate::routing::GuideSnap;

type SegmentEntry = GeomWithData<Line<[f64; 2]>, (GuideId, usize)>;

/// Guide projection found within snap tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapHit {
    pub guide: GuideId,
    pub point: LatLng,
    pub distance_m: f64,
}

impl SnapHit {
    pub fn to_snap(self) -> GuideSnap {
        GuideSnap {
            guide: self.guide,
            point: self.point,
        }
    }
}

#[derive(Debug)]
pub struct SnapIndex {
    frame: LocalFrame,
    tree: RTree<SegmentEntry>,
}

impl SnapIndex {
    pub fn new(guides: &[GuideLine], frame: LocalFrame) -> Self {
        let entries = guides
            .iter()
            .flat_map(|guide| {
                let coords = frame.project_line(guide.geometry.points());
                coords
                    .windows(2)
                    .enumerate()
                    .map(|(idx, w)| {
                        GeomWithData::new(
                            Line::new([w[0].x, w[0].y], [w[1].x, w[1].y]),
                            (guide.id, idx),
                        )
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            frame,
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Closest guide within `max_distance_m`; ties go to the lowest guide id
    pub fn nearest(&self, point: LatLng, max_distance_m: f64) -> Option<SnapHit> {
        let query = self.frame.to_local(point);
        let query = [query.x, query.y];

        let best = self
            .tree
            .locate_within_distance(query, max_distance_m * max_distance_m)
            .map(|entry| (entry.distance_2(&query), entry))
            .min_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| a.data.cmp(&b.data)))?;

        let (distance_2, entry) = best;
        let projected = entry.geom().nearest_point(&query);
        Some(SnapHit {
            guide: entry.data.0,
            point: self.frame.to_lat_lng(Coord {
                x: projected[0],
                y: projected[1],
            }),
            distance_m: distance_2.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Polyline, Side};

    fn frame() -> LocalFrame {
        LocalFrame::new(LatLng::new(52.0, 13.0))
    }

    fn at(x: f64, y: f64) -> LatLng {
        frame().to_lat_lng(Coord { x, y })
    }

    fn guide(id: usize, points: Vec<LatLng>) -> GuideLine {
        GuideLine {
            id: GuideId(id),
            road_id: format!("way/{id}"),
            road_name: None,
            side: Side::Left,
            geometry: Polyline::new(points),
        }
    }

    #[test]
    fn finds_closest_guide_within_tolerance() {
        let guides = vec![
            guide(0, vec![at(0.0, 0.0), at(100.0, 0.0)]),
            guide(1, vec![at(0.0, 8.0), at(100.0, 8.0)]),
        ];
        let index = SnapIndex::new(&guides, frame());
        assert_eq!(index.len(), 2);

        let hit = index.nearest(at(50.0, 6.5), 2.5).unwrap();
        assert_eq!(hit.guide, GuideId(1));
        assert!((hit.distance_m - 1.5).abs() < 1e-6);
        assert!((frame().to_local(hit.point).y - 8.0).abs() < 1e-6);

        assert!(index.nearest(at(50.0, 4.0), 2.5).is_none());
    }

    #[test]
    fn equidistant_guides_resolve_to_lowest_id() {
        // Both guides end at the vertex closest to the query
        let corner = at(100.0, 0.0);
        let guides = vec![
            guide(0, vec![at(0.0, 0.0), corner]),
            guide(1, vec![corner, at(100.0, 100.0)]),
        ];
        let index = SnapIndex::new(&guides, frame());
        let hit = index.nearest(at(100.0, -1.0), 3.0).unwrap();
        assert_eq!(hit.guide, GuideId(0));
    }
}
