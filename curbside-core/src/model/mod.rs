//! Data model for survey annotation
//!
//! Contains coordinates, the study area, road and guide lines, and the
//! annotated segments that make up a dataset.

pub mod coords;
pub mod dataset;
pub mod road;
pub mod segment;
pub mod study_area;

pub use coords::{BoundingBox, LatLng, Polyline};
pub use dataset::{CategoryTotals, Dataset, DatasetSummary};
pub use road::{GuideId, GuideLine, RoadFeature, Side};
pub use segment::{Category, Photo, Segment, SegmentForm, SegmentId, estimate_capacity};
pub use study_area::StudyArea;
