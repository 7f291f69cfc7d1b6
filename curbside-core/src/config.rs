//! Tunables for guide construction, snapping and capacity estimation.
//!
//! Every distance is in metres on the ground.

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_COINCIDENCE_TOLERANCE_M, DEFAULT_GUIDE_OFFSET_M, DEFAULT_SNAP_TOLERANCE_M,
    METERS_PER_SPACE,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Perpendicular distance between a road centreline and its guides
    pub offset_m: f64,
    /// Vertices closer than this to a guide are moved onto it
    pub snap_tolerance_m: f64,
    /// Guide ends closer than this to another guide connect to it when routing
    pub coincidence_tolerance_m: f64,
    /// Kerb length per estimated parking space
    pub meters_per_space: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            offset_m: DEFAULT_GUIDE_OFFSET_M,
            snap_tolerance_m: DEFAULT_SNAP_TOLERANCE_M,
            coincidence_tolerance_m: DEFAULT_COINCIDENCE_TOLERANCE_M,
            meters_per_space: METERS_PER_SPACE,
        }
    }
}
