use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use crate::Error;
use crate::model::{Segment, StudyArea};

/// Segments as a `GeoJSON` `FeatureCollection` of `LineString` features
pub fn segments_to_geojson(segments: &[Segment]) -> Result<FeatureCollection, Error> {
    let features = segments
        .iter()
        .map(segment_to_feature)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

/// Like [`segments_to_geojson`], with the study area appended as a trailing
/// `Polygon` feature tagged `"kind": "study_area"`.
pub fn survey_to_geojson(
    segments: &[Segment],
    boundary: Option<&StudyArea>,
) -> Result<FeatureCollection, Error> {
    let mut collection = segments_to_geojson(segments)?;
    if let Some(area) = boundary {
        collection.features.push(study_area_to_feature(area)?);
    }
    Ok(collection)
}

pub fn segment_to_feature(segment: &Segment) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&segment.geometry().to_line_string()));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "kind": "segment",
            "id": segment.id,
            "category": segment.category,
            "capacity": segment.capacity(),
            "capacity_overridden": segment.capacity_overridden(),
            "rules": segment.rules,
            "time_limit_minutes": segment.time_limit_minutes,
            "street_name": segment.street_name,
            "notes": segment.notes,
            "photos": segment.photos,
            "length_m": segment.length_m(),
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJson(e.to_string()))
}

pub fn study_area_to_feature(area: &StudyArea) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&area.to_polygon()));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "kind": "study_area",
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJson(e.to_string()))
}
