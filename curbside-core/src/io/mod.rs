//! Dataset persistence and export

mod document;
mod to_geojson;

pub use document::{
    DOCUMENT_TYPE, DOCUMENT_VERSION, DatasetDocument, dataset_from_json, dataset_to_json,
};
pub use to_geojson::{
    segment_to_feature, segments_to_geojson, study_area_to_feature, survey_to_geojson,
};
