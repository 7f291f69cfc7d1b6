use log::{debug, info};

use crate::geometry::{clip_line_to_polygon, offset_line};
use crate::model::{GuideId, GuideLine, RoadFeature, Side, StudyArea};

/// Builds left and right guides for every road, clipped to the study area.
///
/// A road can produce several guides per side where the boundary cuts its
/// offset line more than once. Roads with degenerate geometry are skipped.
pub fn build_guides(roads: &[RoadFeature], area: &StudyArea, offset_m: f64) -> Vec<GuideLine> {
    let mut guides = Vec::new();

    for road in roads {
        for side in [Side::Left, Side::Right] {
            let Some(offset) = offset_line(&road.geometry, side.signed(offset_m)) else {
                debug!("Skipping road {}: degenerate geometry", road.id);
                continue;
            };
            for piece in clip_line_to_polygon(&offset, area) {
                guides.push(GuideLine {
                    id: GuideId(guides.len()),
                    road_id: road.id.clone(),
                    road_name: road.name.clone(),
                    side,
                    geometry: piece,
                });
            }
        }
    }

    info!("Built {} guides from {} roads", guides.len(), roads.len());
    guides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{LocalFrame, line_length, nearest_point_on_line};
    use crate::model::{LatLng, Polyline};
    use geo::Coord;

    fn frame() -> LocalFrame {
        LocalFrame::new(LatLng::new(52.0, 13.0))
    }

    fn at(x: f64, y: f64) -> LatLng {
        frame().to_lat_lng(Coord { x, y })
    }

    fn area() -> StudyArea {
        StudyArea::new(vec![
            at(0.0, 0.0),
            at(200.0, 0.0),
            at(200.0, 200.0),
            at(0.0, 200.0),
        ])
        .unwrap()
    }

    #[test]
    fn two_sided_guides_inside_area() {
        let road = RoadFeature::new("way/1", Polyline::new(vec![at(-50.0, 100.0), at(250.0, 100.0)]))
            .with_name("Lindenallee");
        let guides = build_guides(&[road], &area(), 4.0);
        assert_eq!(guides.len(), 2);

        let left = guides.iter().find(|g| g.side == Side::Left).unwrap();
        let right = guides.iter().find(|g| g.side == Side::Right).unwrap();
        assert!((frame().to_local(left.geometry.first().unwrap()).y - 104.0).abs() < 0.05);
        assert!((frame().to_local(right.geometry.first().unwrap()).y - 96.0).abs() < 0.05);
        assert_eq!(left.road_name.as_deref(), Some("Lindenallee"));

        for guide in &guides {
            assert!((line_length(&guide.geometry) - 200.0).abs() < 0.1);
            let mid = nearest_point_on_line(&guide.geometry, at(100.0, 100.0)).unwrap();
            assert!(area().contains(mid.point));
        }
        assert_eq!(guides[0].id, GuideId(0));
        assert_eq!(guides[1].id, GuideId(1));
    }

    #[test]
    fn road_outside_area_has_no_guides() {
        let road = RoadFeature::new("way/2", Polyline::new(vec![at(300.0, 0.0), at(300.0, 200.0)]));
        assert!(build_guides(&[road], &area(), 4.0).is_empty());
    }

    #[test]
    fn road_along_boundary_keeps_inner_side_only() {
        // Left of a northbound road on x=2 is west, right side falls inside
        let road = RoadFeature::new("way/3", Polyline::new(vec![at(2.0, 20.0), at(2.0, 180.0)]));
        let guides = build_guides(&[road], &area(), 4.0);
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].side, Side::Right);
    }

    #[test]
    fn degenerate_roads_are_skipped() {
        let p = at(50.0, 50.0);
        let roads = vec![
            RoadFeature::new("way/4", Polyline::new(vec![p])),
            RoadFeature::new("way/5", Polyline::new(vec![at(10.0, 10.0), at(190.0, 10.0)])),
        ];
        let guides = build_guides(&roads, &area(), 4.0);
        assert_eq!(guides.len(), 2);
        assert!(guides.iter().all(|g| g.road_id == "way/5"));
    }
}
