use geo::Coord;

use super::LocalFrame;
use super::planar::{dedup, dist, infinite_line_intersection};
use crate::model::Polyline;

/// Joins sharper than this (as a multiple of the offset) are bevelled
const MITER_LIMIT: f64 = 4.0;

/// Parallel copy of `line` displaced by `signed_distance_m` metres.
///
/// Positive distances shift to the left of the vertex order, negative to the
/// right. Repeated vertices are dropped and sharp corners bevelled, so the
/// point count can differ from the input.
pub fn offset_line(line: &Polyline, signed_distance_m: f64) -> Option<Polyline> {
    if line.len() < 2 || !signed_distance_m.is_finite() {
        return None;
    }
    let frame = LocalFrame::around(line.points())?;
    let coords = dedup(&frame.project_line(line.points()));
    if coords.len() < 2 {
        return None;
    }
    if signed_distance_m == 0.0 {
        return Some(line.clone());
    }

    let shifted = shift_coords(&coords, signed_distance_m);
    Some(Polyline::new(frame.unproject_line(&shifted)))
}

fn left_normal(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    let len = dist(a, b);
    Coord {
        x: -(b.y - a.y) / len,
        y: (b.x - a.x) / len,
    }
}

fn shift_coords(coords: &[Coord<f64>], d: f64) -> Vec<Coord<f64>> {
    // Each segment shifted along its own normal
    let segments: Vec<(Coord<f64>, Coord<f64>)> = coords
        .windows(2)
        .map(|w| {
            let n = left_normal(w[0], w[1]) * d;
            (w[0] + n, w[1] + n)
        })
        .collect();

    let mut out = Vec::with_capacity(coords.len() + 2);
    out.push(segments[0].0);
    for (k, pair) in segments.windows(2).enumerate() {
        let (prev, next) = (pair[0], pair[1]);
        let vertex = coords[k + 1];
        match infinite_line_intersection(prev.0, prev.1, next.0, next.1) {
            Some(miter) if dist(miter, vertex) <= MITER_LIMIT * d.abs() => out.push(miter),
            // Parallel neighbours share the shifted vertex
            None => out.push(prev.1),
            _ => {
                out.push(prev.1);
                out.push(next.0);
            }
        }
    }
    out.push(segments[segments.len() - 1].1);
    dedup(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{distance_m, nearest_point_on_line};
    use crate::model::LatLng;

    fn frame() -> LocalFrame {
        LocalFrame::new(LatLng::new(52.0, 13.0))
    }

    fn at(x: f64, y: f64) -> LatLng {
        frame().to_lat_lng(Coord { x, y })
    }

    fn local(p: LatLng) -> Coord<f64> {
        frame().to_local(p)
    }

    #[test]
    fn positive_offset_is_left_of_travel() {
        // Heading east: left is north
        let line = Polyline::new(vec![at(0.0, 0.0), at(100.0, 0.0)]);
        let left = offset_line(&line, 4.0).unwrap();
        let right = offset_line(&line, -4.0).unwrap();
        for p in left.points() {
            assert!((local(*p).y - 4.0).abs() < 0.01);
        }
        for p in right.points() {
            assert!((local(*p).y + 4.0).abs() < 0.01);
        }
    }

    #[test]
    fn opposite_signs_land_on_opposite_sides() {
        let line = Polyline::new(vec![at(0.0, 0.0), at(60.0, 30.0), at(90.0, 100.0)]);
        let left = offset_line(&line, 5.0).unwrap();
        let right = offset_line(&line, -5.0).unwrap();
        for probe in [at(20.0, 10.0), at(75.0, 65.0)] {
            let on_line = nearest_point_on_line(&line, probe).unwrap();
            let l = nearest_point_on_line(&left, on_line.point).unwrap();
            let r = nearest_point_on_line(&right, on_line.point).unwrap();
            let base = local(on_line.point);
            let dl = local(l.point) - base;
            let dr = local(r.point) - base;
            // Displacements point in opposite directions
            assert!(dl.x * dr.x + dl.y * dr.y < 0.0);
            assert!((l.distance_m - 5.0).abs() < 0.05);
            assert!((r.distance_m - 5.0).abs() < 0.05);
        }
    }

    #[test]
    fn corners_keep_constant_distance() {
        let line = Polyline::new(vec![at(0.0, 0.0), at(50.0, 0.0), at(50.0, 50.0)]);
        let left = offset_line(&line, 4.0).unwrap();
        // Left turn: inner corner at (46, 4)
        let corner = left
            .points()
            .iter()
            .map(|p| local(*p))
            .find(|c| (c.x - 46.0).abs() < 0.01 && (c.y - 4.0).abs() < 0.01);
        assert!(corner.is_some());
        assert!(distance_m(left.points()[0], at(0.0, 4.0)) < 0.01);
    }

    #[test]
    fn hairpin_is_bevelled() {
        let line = Polyline::new(vec![at(0.0, 0.0), at(50.0, 0.0), at(0.0, 1.0)]);
        let shifted = offset_line(&line, -4.0).unwrap();
        for p in shifted.points() {
            assert!(local(*p).x < 50.0 + 4.0 * MITER_LIMIT);
        }
    }

    #[test]
    fn degenerate_input() {
        let p = at(0.0, 0.0);
        assert!(offset_line(&Polyline::new(vec![p]), 4.0).is_none());
        assert!(offset_line(&Polyline::new(vec![p, p]), 4.0).is_none());
    }
}
