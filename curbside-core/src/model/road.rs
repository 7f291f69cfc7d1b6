//! Road centrelines and the guide lines derived from them

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Polyline;

/// Street centreline as delivered by the road data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadFeature {
    /// Opaque identifier assigned by the data source
    pub id: String,
    pub name: Option<String>,
    pub geometry: Polyline,
}

impl RoadFeature {
    pub fn new(id: impl Into<String>, geometry: Polyline) -> Self {
        Self {
            id: id.into(),
            name: None,
            geometry,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Side of a road relative to its vertex order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Offset distance with the sign convention of `offset_line`
    pub fn signed(self, offset_m: f64) -> f64 {
        match self {
            Side::Left => offset_m.abs(),
            Side::Right => -offset_m.abs(),
        }
    }
}

/// Index of a guide within the guide set it was built in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuideId(pub usize);

impl fmt::Display for GuideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "guide#{}", self.0)
    }
}

/// Offset copy of one road, clipped to the study area
#[derive(Debug, Clone, PartialEq)]
pub struct GuideLine {
    pub id: GuideId,
    pub road_id: String,
    pub road_name: Option<String>,
    pub side: Side,
    pub geometry: Polyline,
}
