pub use crate::{
    DEFAULT_COINCIDENCE_TOLERANCE_M, DEFAULT_GUIDE_OFFSET_M, DEFAULT_SNAP_TOLERANCE_M,
    METERS_PER_SPACE, Millimeters,
};

// Re-export key components
pub use crate::config::SnapConfig;
pub use crate::error::Error;
pub use crate::geometry::{
    NearestPoint, clip_line_to_polygon, distance_m, line_length, nearest_point_on_line,
    offset_line, slice_line_between,
};
pub use crate::guides::{GuideSet, build_guides};
pub use crate::io::{dataset_from_json, dataset_to_json, segments_to_geojson};
pub use crate::model::{
    BoundingBox, Category, Dataset, DatasetSummary, GuideId, GuideLine, LatLng, Photo,
    Polyline, RoadFeature, Segment, SegmentForm, SegmentId, Side, StudyArea,
};
pub use crate::routing::{GuideSnap, find_path};
pub use crate::snapping::{DrawOutcome, DrawSession, DrawState, GuideTouch, VertexOutcome};
