use thiserror::Error;

use crate::model::SegmentId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Study area boundary intersects itself")]
    SelfIntersecting,
    #[error("Unknown segment: {0}")]
    UnknownSegment(SegmentId),
    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJson(String),
}
