//! Shortest connection between two guide touches, travelling along guides

mod dijkstra;
mod network;
mod state;

use log::debug;

use crate::geometry::slice_line_between;
use crate::model::{GuideId, GuideLine, LatLng, Polyline};
use network::GuideNetwork;

/// Point lying on a specific guide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideSnap {
    pub guide: GuideId,
    pub point: LatLng,
}

/// Shortest along-guide line from `start` to `end`.
///
/// Guides connect where they cross, where they overlap, and where the end of
/// one lies within `tolerance_m` of another. Returns `None` when the two
/// points are not connected or the route has no length.
pub fn find_path(
    guides: &[GuideLine],
    start: &GuideSnap,
    end: &GuideSnap,
    tolerance_m: f64,
) -> Option<Polyline> {
    if start.guide == end.guide {
        let guide = guides.iter().find(|g| g.id == start.guide)?;
        return slice_line_between(&guide.geometry, start.point, end.point);
    }

    let network = GuideNetwork::build(guides, start, end, tolerance_m)?;
    let Some(steps) = dijkstra::shortest_path(network.graph(), network.start(), network.end())
    else {
        debug!("{} and {} are not connected", start.guide, end.guide);
        return None;
    };
    network.assemble(&steps)
}
