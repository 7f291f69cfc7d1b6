//! Guide construction, snapping and routing for street-parking surveys.
//!
//! Road centrelines inside a study area are turned into offset "guide" lines,
//! freehand strokes are snapped onto those guides (or routed across them), and
//! the resulting segments keep their length-derived capacity in sync.

pub mod config;
mod error;
pub mod geometry;
pub mod guides;
pub mod io;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod snapping;

pub use config::SnapConfig;
pub use error::Error;
pub use guides::{GuideSet, build_guides};
pub use model::{
    BoundingBox, Category, Dataset, DatasetSummary, GuideId, GuideLine, LatLng, Photo,
    Polyline, RoadFeature, Segment, SegmentForm, SegmentId, Side, StudyArea,
};
pub use routing::{GuideSnap, find_path};
pub use snapping::{DrawOutcome, DrawSession, DrawState, GuideTouch, VertexOutcome};

/// Along-guide distance in millimetres, used as routing edge weight
pub type Millimeters = u32;

/// Kerb length taken by one parked car
pub const METERS_PER_SPACE: f64 = 5.5;

/// Distance between a road centreline and its guides
pub const DEFAULT_GUIDE_OFFSET_M: f64 = 4.0;

/// Maximum distance between a drawn vertex and a guide for the vertex to snap
pub const DEFAULT_SNAP_TOLERANCE_M: f64 = 2.5;

/// Guides whose ends come this close to another guide are treated as connected
pub const DEFAULT_COINCIDENCE_TOLERANCE_M: f64 = 5.0;
