//! Snap guides derived from road centrelines

mod builder;

pub use builder::build_guides;

use crate::config::SnapConfig;
use crate::geometry::LocalFrame;
use crate::model::{GuideId, GuideLine, LatLng, RoadFeature, StudyArea};
use crate::snapping::{SnapHit, SnapIndex};

/// Immutable snapshot of the active guides together with their spatial index.
///
/// Rebuilt wholesale whenever the roads or the study area change.
#[derive(Debug, Default)]
pub struct GuideSet {
    guides: Vec<GuideLine>,
    index: Option<SnapIndex>,
}

impl GuideSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build(roads: &[RoadFeature], area: &StudyArea, config: &SnapConfig) -> Self {
        Self::from_guides(build_guides(roads, area, config.offset_m), area.frame())
    }

    pub fn from_guides(guides: Vec<GuideLine>, frame: LocalFrame) -> Self {
        if guides.is_empty() {
            return Self::empty();
        }
        let index = SnapIndex::new(&guides, frame);
        Self {
            guides,
            index: Some(index),
        }
    }

    pub fn guides(&self) -> &[GuideLine] {
        &self.guides
    }

    pub fn len(&self) -> usize {
        self.guides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }

    pub fn get(&self, id: GuideId) -> Option<&GuideLine> {
        self.guides
            .get(id.0)
            .filter(|g| g.id == id)
            .or_else(|| self.guides.iter().find(|g| g.id == id))
    }

    /// Closest guide within `max_distance_m` of `point`
    pub fn nearest(&self, point: LatLng, max_distance_m: f64) -> Option<SnapHit> {
        self.index.as_ref()?.nearest(point, max_distance_m)
    }
}
