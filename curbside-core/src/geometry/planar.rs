//! Planar helpers shared by the geometry, routing and snapping modules.
//! Coordinates are `LocalFrame` metres.

use geo::Coord;

/// Points closer than this are the same point
pub(crate) const EPSILON_M: f64 = 1e-6;

pub(crate) fn dist(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn lerp(a: Coord<f64>, b: Coord<f64>, t: f64) -> Coord<f64> {
    Coord {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
    }
}

/// Closest point of segment `a`-`b` to `p` and its parameter along the segment
pub(crate) fn project_onto_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> (Coord<f64>, f64) {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 <= f64::EPSILON {
        return (a, 0.0);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    (lerp(a, b, t), t)
}

/// Cumulative distance of every vertex from the start of the line
pub(crate) fn stations(coords: &[Coord<f64>]) -> Vec<f64> {
    let mut total = 0.0;
    let mut out = Vec::with_capacity(coords.len());
    out.push(0.0);
    for w in coords.windows(2) {
        total += dist(w[0], w[1]);
        out.push(total);
    }
    out
}

/// Drops consecutive points closer than `EPSILON_M`
pub(crate) fn dedup(coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
    for &c in coords {
        if out.last().is_none_or(|last| dist(*last, c) > EPSILON_M) {
            out.push(c);
        }
    }
    out
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PlanarHit {
    pub point: Coord<f64>,
    pub distance: f64,
    pub segment_index: usize,
    /// Distance from the start of the line to `point`
    pub along: f64,
}

/// Nearest point on the polyline; equal distances keep the earliest segment
pub(crate) fn nearest_on(coords: &[Coord<f64>], stations: &[f64], p: Coord<f64>) -> Option<PlanarHit> {
    let mut best: Option<PlanarHit> = None;
    for (idx, w) in coords.windows(2).enumerate() {
        let (point, _) = project_onto_segment(p, w[0], w[1]);
        let distance = dist(p, point);
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(PlanarHit {
                point,
                distance,
                segment_index: idx,
                along: stations[idx] + dist(w[0], point),
            });
        }
    }
    best
}

/// Point at distance `station` from the start, clamped to the line
pub(crate) fn point_at(coords: &[Coord<f64>], stations: &[f64], station: f64) -> Coord<f64> {
    let idx = stations.partition_point(|&s| s < station);
    if idx == 0 {
        return coords[0];
    }
    if idx >= coords.len() {
        return coords[coords.len() - 1];
    }
    let span = stations[idx] - stations[idx - 1];
    if span <= f64::EPSILON {
        return coords[idx];
    }
    lerp(
        coords[idx - 1],
        coords[idx],
        (station - stations[idx - 1]) / span,
    )
}

/// Portion of the line between two stations, ordered from `from` to `to`
pub(crate) fn slice_between(
    coords: &[Coord<f64>],
    stations: &[f64],
    from: f64,
    to: f64,
) -> Vec<Coord<f64>> {
    if from > to {
        let mut reversed = slice_between(coords, stations, to, from);
        reversed.reverse();
        return reversed;
    }
    let mut out = Vec::new();
    out.push(point_at(coords, stations, from));
    for (c, s) in coords.iter().zip(stations) {
        if *s > from + EPSILON_M && *s < to - EPSILON_M {
            out.push(*c);
        }
    }
    out.push(point_at(coords, stations, to));
    dedup(&out)
}

/// Intersection of the infinite lines through `a1`-`a2` and `b1`-`b2`
pub(crate) fn infinite_line_intersection(
    a1: Coord<f64>,
    a2: Coord<f64>,
    b1: Coord<f64>,
    b2: Coord<f64>,
) -> Option<Coord<f64>> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < 1e-12 {
        return None;
    }
    let q = b1 - a1;
    let t = (q.x * s.y - q.y * s.x) / denom;
    Some(lerp(a1, a2, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn nearest_prefers_earliest_segment_on_ties() {
        // p is equidistant from both legs of the V
        let coords = vec![c(-10.0, 10.0), c(0.0, 0.0), c(10.0, 10.0)];
        let st = stations(&coords);
        let hit = nearest_on(&coords, &st, c(0.0, 10.0)).unwrap();
        assert_eq!(hit.segment_index, 0);
    }

    #[test]
    fn slice_reverses_when_stations_are_swapped() {
        let coords = vec![c(0.0, 0.0), c(10.0, 0.0), c(10.0, 10.0)];
        let st = stations(&coords);
        let forward = slice_between(&coords, &st, 5.0, 15.0);
        assert_eq!(forward, vec![c(5.0, 0.0), c(10.0, 0.0), c(10.0, 5.0)]);
        let backward = slice_between(&coords, &st, 15.0, 5.0);
        assert_eq!(backward, vec![c(10.0, 5.0), c(10.0, 0.0), c(5.0, 0.0)]);
    }

    #[test]
    fn parallel_lines_do_not_meet() {
        assert!(
            infinite_line_intersection(c(0.0, 0.0), c(1.0, 0.0), c(0.0, 1.0), c(1.0, 1.0))
                .is_none()
        );
        let x = infinite_line_intersection(c(0.0, 0.0), c(1.0, 0.0), c(5.0, -1.0), c(5.0, 1.0))
            .unwrap();
        assert!((x.x - 5.0).abs() < 1e-12 && x.y.abs() < 1e-12);
    }
}
