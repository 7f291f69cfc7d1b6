//! Versioned JSON document for local persistence

use chrono::{DateTime, Utc};
use itertools::{Either, Itertools};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Dataset, Segment, StudyArea};
use crate::{Error, METERS_PER_SPACE};

pub const DOCUMENT_TYPE: &str = "curbside-dataset";
pub const DOCUMENT_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: u32,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub boundary: Option<StudyArea>,
}

impl DatasetDocument {
    pub fn new(dataset: &Dataset, saved_at: DateTime<Utc>) -> Self {
        Self {
            kind: DOCUMENT_TYPE.to_string(),
            version: DOCUMENT_VERSION,
            saved_at: Some(saved_at),
            segments: dataset.segments().to_vec(),
            boundary: dataset.boundary().cloned(),
        }
    }

    pub fn into_dataset(self) -> Dataset {
        Dataset::new(restore_segments(self.segments, false), self.boundary)
    }
}

pub fn dataset_to_json(dataset: &Dataset, saved_at: DateTime<Utc>) -> Result<String, Error> {
    Ok(serde_json::to_string(&DatasetDocument::new(dataset, saved_at))?)
}

/// Reads a saved document, or a bare segment array written by older versions.
///
/// Lengths are always recomputed from geometry. Segments whose geometry is
/// unusable are dropped with a warning.
pub fn dataset_from_json(text: &str) -> Result<Dataset, Error> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => {
            debug!("Importing legacy segment list ({} items)", items.len());
            let segments: Vec<Segment> = serde_json::from_value(Value::Array(items))?;
            Ok(Dataset::new(restore_segments(segments, true), None))
        }
        value @ Value::Object(_) => {
            let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
            if kind != DOCUMENT_TYPE {
                return Err(Error::UnsupportedDocument(format!(
                    "expected type \"{DOCUMENT_TYPE}\", found \"{kind}\""
                )));
            }
            let document: DatasetDocument = serde_json::from_value(value)?;
            if document.version == 0 || document.version > DOCUMENT_VERSION {
                return Err(Error::UnsupportedDocument(format!(
                    "version {} is not supported",
                    document.version
                )));
            }
            Ok(document.into_dataset())
        }
        _ => Err(Error::UnsupportedDocument(
            "expected an object or an array".to_string(),
        )),
    }
}

/// Legacy records have no stored capacity, so theirs is estimated again
fn restore_segments(segments: Vec<Segment>, legacy: bool) -> Vec<Segment> {
    let (kept, dropped): (Vec<_>, Vec<_>) = segments.into_iter().partition_map(|mut segment| {
        if !segment.geometry().is_valid() {
            return Either::Right(segment.id);
        }
        if legacy {
            segment.resync(METERS_PER_SPACE);
        } else {
            segment.refresh_length();
        }
        Either::Left(segment)
    });
    for id in dropped {
        warn!("Dropping segment {id} with unusable geometry");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, LatLng, Photo, Polyline, SegmentForm};
    use chrono::TimeZone;

    fn area() -> StudyArea {
        StudyArea::new(vec![
            LatLng::new(52.0, 13.0),
            LatLng::new(52.0, 13.01),
            LatLng::new(52.01, 13.01),
            LatLng::new(52.01, 13.0),
        ])
        .unwrap()
    }

    fn sample() -> Dataset {
        let mut segment = Segment::new(
            Polyline::new(vec![LatLng::new(52.001, 13.001), LatLng::new(52.001, 13.002)]),
            METERS_PER_SPACE,
        )
        .unwrap();
        segment.apply_form(SegmentForm {
            category: Category::TimeLimited,
            capacity: Some(3),
            rules: "Mo-Fr 8-18".to_string(),
            time_limit_minutes: Some(120),
            street_name: "Lindenallee".to_string(),
            notes: String::new(),
            photos: vec![Photo {
                data_uri: "data:image/png;base64,iVBORw0KGgo=".to_string(),
                caption: Some("north end".to_string()),
            }],
        });
        Dataset::new(vec![segment], Some(area()))
    }

    #[test]
    fn save_and_load_preserve_the_dataset() {
        let dataset = sample();
        let saved_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let json = dataset_to_json(&dataset, saved_at).unwrap();

        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], DOCUMENT_TYPE);
        assert_eq!(value["version"], DOCUMENT_VERSION);

        let loaded = dataset_from_json(&json).unwrap();
        assert_eq!(loaded, dataset);
        assert!(loaded.segments()[0].capacity_overridden());
    }

    #[test]
    fn empty_dataset_has_null_boundary() {
        let json = dataset_to_json(&Dataset::default(), Utc.timestamp_opt(0, 0).unwrap()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert!(value["boundary"].is_null());
        assert!(dataset_from_json(&json).unwrap().is_empty());
    }

    #[test]
    fn legacy_array_is_imported() {
        let json = r#"[
            {"id": 1700000000000, "geometry": [{"lat": 52.0, "lng": 13.0}, {"lat": 52.0, "lng": 13.0008}],
             "category": "residents_only"},
            {"id": "broken", "geometry": [{"lat": 52.0, "lng": 13.0}]}
        ]"#;
        let dataset = dataset_from_json(json).unwrap();
        assert_eq!(dataset.len(), 1);
        let segment = &dataset.segments()[0];
        assert_eq!(segment.id.as_str(), "1700000000000");
        assert_eq!(segment.category, Category::ResidentsOnly);
        assert!(segment.length_m() > 50.0);
        assert_eq!(segment.capacity(), 10);
        assert!(!segment.capacity_overridden());
    }

    #[test]
    fn stored_length_is_recomputed() {
        let json = dataset_to_json(&sample(), Utc.timestamp_opt(0, 0).unwrap()).unwrap();
        let tampered = json.replace("\"length_m\":", "\"length_m\":9999.0,\"_old\":");
        let loaded = dataset_from_json(&tampered).unwrap();
        assert!(loaded.segments()[0].length_m() < 100.0);
    }

    #[test]
    fn foreign_documents_are_rejected() {
        assert!(matches!(
            dataset_from_json(r#"{"type": "FeatureCollection", "features": []}"#),
            Err(Error::UnsupportedDocument(_))
        ));
        assert!(matches!(
            dataset_from_json(r#"{"type": "curbside-dataset", "version": 9}"#),
            Err(Error::UnsupportedDocument(_))
        ));
        assert!(matches!(dataset_from_json("42"), Err(Error::UnsupportedDocument(_))));
        assert!(matches!(dataset_from_json("{"), Err(Error::Json(_))));
    }
}
