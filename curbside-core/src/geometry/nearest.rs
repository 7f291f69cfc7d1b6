use super::LocalFrame;
use super::planar::{nearest_on, stations};
use crate::model::{LatLng, Polyline};

/// Projection of a point onto a polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    pub point: LatLng,
    /// Distance between the query and `point`, in metres
    pub distance_m: f64,
    /// Index of the line segment `point` lies on
    pub segment_index: usize,
    /// Distance along the line from its first point to `point`, in metres
    pub along_m: f64,
}

/// Closest point lying on `line` (not on its extension).
///
/// Returns `None` for lines with fewer than two points or zero length.
pub fn nearest_point_on_line(line: &Polyline, point: LatLng) -> Option<NearestPoint> {
    if line.len() < 2 {
        return None;
    }
    let frame = LocalFrame::new(point);
    let coords = frame.project_line(line.points());
    let st = stations(&coords);
    if st.last().is_none_or(|total| *total <= 0.0) {
        return None;
    }
    let hit = nearest_on(&coords, &st, frame.to_local(point))?;
    Some(NearestPoint {
        point: frame.to_lat_lng(hit.point),
        distance_m: hit.distance,
        segment_index: hit.segment_index,
        along_m: hit.along,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    fn frame() -> LocalFrame {
        LocalFrame::new(LatLng::new(52.0, 13.0))
    }

    fn at(x: f64, y: f64) -> LatLng {
        frame().to_lat_lng(Coord { x, y })
    }

    #[test]
    fn projects_onto_interior_of_segment() {
        let line = Polyline::new(vec![at(0.0, 0.0), at(100.0, 0.0), at(100.0, 100.0)]);
        let hit = nearest_point_on_line(&line, at(30.0, 12.0)).unwrap();
        assert_eq!(hit.segment_index, 0);
        assert!((hit.distance_m - 12.0).abs() < 0.01);
        assert!((hit.along_m - 30.0).abs() < 0.01);

        let hit = nearest_point_on_line(&line, at(110.0, 60.0)).unwrap();
        assert_eq!(hit.segment_index, 1);
        assert!((hit.along_m - 160.0).abs() < 0.01);
    }

    #[test]
    fn clamps_to_line_ends() {
        let line = Polyline::new(vec![at(0.0, 0.0), at(100.0, 0.0)]);
        let hit = nearest_point_on_line(&line, at(-30.0, 40.0)).unwrap();
        assert!((hit.distance_m - 50.0).abs() < 0.01);
        assert!(hit.along_m.abs() < 1e-6);
    }

    #[test]
    fn degenerate_lines_have_no_nearest_point() {
        let p = at(0.0, 0.0);
        assert!(nearest_point_on_line(&Polyline::new(vec![p]), p).is_none());
        assert!(nearest_point_on_line(&Polyline::new(vec![p, p]), p).is_none());
    }
}
