use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Contains, Coord, Line, LineString, Point, Polygon};

use super::planar::{EPSILON_M, dist, point_at, slice_between, stations};
use crate::model::{Polyline, StudyArea};

/// Splits `line` at every crossing with the study-area boundary and keeps the
/// pieces whose midpoint lies strictly inside.
///
/// A line wholly inside comes back unchanged as the only piece; a line wholly
/// outside yields nothing.
pub fn clip_line_to_polygon(line: &Polyline, area: &StudyArea) -> Vec<Polyline> {
    if !line.is_valid() {
        return Vec::new();
    }
    let frame = area.frame();
    let coords = frame.project_line(line.points());
    let st = stations(&coords);
    let total = st[st.len() - 1];

    let ring = frame.project_line(area.ring());
    let polygon = Polygon::new(LineString::from(ring.clone()), vec![]);
    let edges: Vec<Line<f64>> = (0..ring.len())
        .map(|i| Line::new(ring[i], ring[(i + 1) % ring.len()]))
        .collect();

    let mut cuts = vec![0.0, total];
    for (idx, w) in coords.windows(2).enumerate() {
        let segment = Line::new(w[0], w[1]);
        for edge in &edges {
            match line_intersection(segment, *edge) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    cuts.push(st[idx] + dist(w[0], intersection));
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    cuts.push(st[idx] + dist(w[0], intersection.start));
                    cuts.push(st[idx] + dist(w[0], intersection.end));
                }
                None => {}
            }
        }
    }
    cuts.sort_by(f64::total_cmp);
    cuts.dedup_by(|a, b| (*a - *b).abs() <= EPSILON_M);

    // Consecutive inside intervals are merged, so touching the boundary
    // without crossing it does not split the line
    let mut kept: Vec<(f64, f64)> = Vec::new();
    for w in cuts.windows(2) {
        let (from, to) = (w[0], w[1]);
        if to - from <= EPSILON_M {
            continue;
        }
        let mid = point_at(&coords, &st, (from + to) / 2.0);
        if !polygon.contains(&Point::from(mid)) {
            continue;
        }
        match kept.last_mut() {
            Some(last) if (last.1 - from).abs() <= EPSILON_M => last.1 = to,
            _ => kept.push((from, to)),
        }
    }

    kept.into_iter()
        .map(|(from, to)| {
            if from <= EPSILON_M && to >= total - EPSILON_M {
                return line.clone();
            }
            let piece: Vec<Coord<f64>> = slice_between(&coords, &st, from, to);
            Polyline::new(frame.unproject_line(&piece))
        })
        .filter(|piece| piece.len() >= 2)
        .collect()
}
