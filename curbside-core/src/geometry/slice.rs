use super::LocalFrame;
use super::planar::{EPSILON_M, nearest_on, slice_between, stations};
use crate::model::{LatLng, Polyline};

/// Portion of `line` between the projections of `a` and `b`, inclusive.
///
/// The result keeps the direction of `line` whatever the order of `a` and
/// `b`. Returns `None` for degenerate lines or when both points project to the
/// same place.
pub fn slice_line_between(line: &Polyline, a: LatLng, b: LatLng) -> Option<Polyline> {
    if line.len() < 2 {
        return None;
    }
    let frame = LocalFrame::around(line.points())?;
    let coords = frame.project_line(line.points());
    let st = stations(&coords);
    let sa = nearest_on(&coords, &st, frame.to_local(a))?.along;
    let sb = nearest_on(&coords, &st, frame.to_local(b))?.along;
    let (from, to) = if sa <= sb { (sa, sb) } else { (sb, sa) };
    if to - from <= EPSILON_M {
        return None;
    }
    let piece = slice_between(&coords, &st, from, to);
    (piece.len() >= 2).then(|| Polyline::new(frame.unproject_line(&piece)))
}
