//! Annotated street-parking segments and their metadata synchronisation

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::Polyline;
use crate::{Error, METERS_PER_SPACE};

/// Parking regulation of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Unrestricted,
    ResidentsOnly,
    TimeLimited,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Unrestricted,
        Category::ResidentsOnly,
        Category::TimeLimited,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Unrestricted => "unrestricted",
            Category::ResidentsOnly => "residents_only",
            Category::TimeLimited => "time_limited",
        }
    }
}

/// Stable, opaque segment identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Older exports used numeric timestamps as ids
impl<'de> Deserialize<'de> for SegmentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => SegmentId(text),
            RawId::Number(number) => SegmentId(number.to_string()),
        })
    }
}

/// Image attachment, stored inline as a data URI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub data_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Estimated number of parking spaces along `length_m` of kerb, at least one
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn estimate_capacity(length_m: f64, meters_per_space: f64) -> u32 {
    let per_space = if meters_per_space > 0.0 {
        meters_per_space
    } else {
        METERS_PER_SPACE
    };
    let spaces = (length_m.max(0.0) / per_space).round();
    (spaces as u32).max(1)
}

/// A user-annotated kerb line
///
/// `length_m` always reflects the current geometry. `capacity` follows the
/// length until the user enters a value, after which it is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    geometry: Polyline,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    capacity: u32,
    #[serde(default)]
    capacity_overridden: bool,
    #[serde(default)]
    pub rules: String,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub street_name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    length_m: f64,
}

impl Segment {
    /// Creates a segment with a fresh id and an estimated capacity
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry has fewer than two points or no length
    pub fn new(geometry: Polyline, meters_per_space: f64) -> Result<Self, Error> {
        Self::with_id(SegmentId::generate(), geometry, meters_per_space)
    }

    pub fn with_id(
        id: SegmentId,
        geometry: Polyline,
        meters_per_space: f64,
    ) -> Result<Self, Error> {
        let mut segment = Self {
            id,
            geometry: Polyline::default(),
            category: Category::default(),
            capacity: 0,
            capacity_overridden: false,
            rules: String::new(),
            time_limit_minutes: None,
            street_name: String::new(),
            notes: String::new(),
            photos: Vec::new(),
            length_m: 0.0,
        };
        segment.sync_geometry(geometry, meters_per_space)?;
        Ok(segment)
    }

    pub fn geometry(&self) -> &Polyline {
        &self.geometry
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn capacity_overridden(&self) -> bool {
        self.capacity_overridden
    }

    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    /// Replaces the geometry and resynchronises length and capacity.
    /// Invalid geometry leaves the segment untouched.
    pub fn sync_geometry(&mut self, geometry: Polyline, meters_per_space: f64) -> Result<(), Error> {
        if !geometry.is_valid() {
            return Err(Error::InvalidGeometry(format!(
                "segment geometry needs 2+ points and a length, got {} points",
                geometry.len()
            )));
        }
        self.geometry = geometry;
        self.resync(meters_per_space);
        Ok(())
    }

    /// Recomputes length, and capacity unless overridden
    pub fn resync(&mut self, meters_per_space: f64) {
        self.refresh_length();
        if !self.capacity_overridden {
            self.capacity = estimate_capacity(self.length_m, meters_per_space);
        }
    }

    pub(crate) fn refresh_length(&mut self) {
        self.length_m = self.geometry.length_m();
    }

    /// Applies a metadata-form save. Entering a capacity pins it permanently.
    pub fn apply_form(&mut self, form: SegmentForm) {
        self.category = form.category;
        self.rules = form.rules;
        self.time_limit_minutes = match form.category {
            Category::TimeLimited => form.time_limit_minutes,
            _ => None,
        };
        self.street_name = form.street_name;
        self.notes = form.notes;
        self.photos = form.photos;
        if let Some(capacity) = form.capacity {
            self.capacity = capacity;
            self.capacity_overridden = true;
        }
    }

    /// Current metadata as a form, with capacity left untouched
    pub fn to_form(&self) -> SegmentForm {
        SegmentForm {
            category: self.category,
            capacity: None,
            rules: self.rules.clone(),
            time_limit_minutes: self.time_limit_minutes,
            street_name: self.street_name.clone(),
            notes: self.notes.clone(),
            photos: self.photos.clone(),
        }
    }
}

/// Fields replaced by a metadata-form save
///
/// `capacity` is `Some` only when the user typed a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentForm {
    pub category: Category,
    pub capacity: Option<u32>,
    pub rules: String,
    pub time_limit_minutes: Option<u32>,
    pub street_name: String,
    pub notes: String,
    pub photos: Vec<Photo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LocalFrame;
    use crate::model::LatLng;
    use geo::Coord;

    /// Straight east-west line of the given length
    fn line_of(length_m: f64) -> Polyline {
        let frame = LocalFrame::new(LatLng::new(52.0, 13.0));
        Polyline::new(vec![
            frame.to_lat_lng(Coord { x: 0.0, y: 0.0 }),
            frame.to_lat_lng(Coord { x: length_m, y: 0.0 }),
        ])
    }

    #[test]
    fn capacity_estimate_for_55_meters() {
        let segment = Segment::new(line_of(55.0), METERS_PER_SPACE).unwrap();
        assert!((segment.length_m() - 55.0).abs() < 0.1);
        assert_eq!(segment.capacity(), 10);
        assert!(!segment.capacity_overridden());
    }

    #[test]
    fn short_segments_hold_one_space() {
        assert_eq!(estimate_capacity(1.0, METERS_PER_SPACE), 1);
        assert_eq!(estimate_capacity(0.0, METERS_PER_SPACE), 1);
        assert_eq!(estimate_capacity(11.0, 0.0), 2);
    }

    #[test]
    fn resync_is_idempotent() {
        let mut segment = Segment::new(line_of(37.0), METERS_PER_SPACE).unwrap();
        segment.resync(METERS_PER_SPACE);
        let first = (segment.length_m(), segment.capacity());
        segment.resync(METERS_PER_SPACE);
        assert_eq!((segment.length_m(), segment.capacity()), first);
    }

    #[test]
    fn geometry_edit_recomputes_capacity() {
        let mut segment = Segment::new(line_of(55.0), METERS_PER_SPACE).unwrap();
        segment.sync_geometry(line_of(110.0), METERS_PER_SPACE).unwrap();
        assert_eq!(segment.capacity(), 20);
    }

    #[test]
    fn overridden_capacity_survives_geometry_edits() {
        let mut segment = Segment::new(line_of(55.0), METERS_PER_SPACE).unwrap();
        let mut form = segment.to_form();
        form.capacity = Some(3);
        segment.apply_form(form);
        assert!(segment.capacity_overridden());

        for length in [10.0, 200.0, 55.0] {
            segment.sync_geometry(line_of(length), METERS_PER_SPACE).unwrap();
            assert_eq!(segment.capacity(), 3);
            assert!((segment.length_m() - length).abs() < 0.1);
        }

        // A later form save without capacity keeps the pinned value
        segment.apply_form(segment.to_form());
        assert_eq!(segment.capacity(), 3);
        assert!(segment.capacity_overridden());
    }

    #[test]
    fn invalid_geometry_keeps_previous_state() {
        let mut segment = Segment::new(line_of(55.0), METERS_PER_SPACE).unwrap();
        let before = segment.clone();
        let degenerate = Polyline::new(vec![LatLng::new(52.0, 13.0)]);
        assert!(segment.sync_geometry(degenerate, METERS_PER_SPACE).is_err());
        assert_eq!(segment, before);
        assert!(Segment::new(Polyline::default(), METERS_PER_SPACE).is_err());
    }

    #[test]
    fn time_limit_only_kept_for_time_limited() {
        let mut segment = Segment::new(line_of(20.0), METERS_PER_SPACE).unwrap();
        segment.apply_form(SegmentForm {
            category: Category::ResidentsOnly,
            time_limit_minutes: Some(60),
            ..SegmentForm::default()
        });
        assert_eq!(segment.time_limit_minutes, None);

        segment.apply_form(SegmentForm {
            category: Category::TimeLimited,
            time_limit_minutes: Some(120),
            ..SegmentForm::default()
        });
        assert_eq!(segment.time_limit_minutes, Some(120));
    }

    #[test]
    fn numeric_ids_are_accepted() {
        let id: SegmentId = serde_json::from_str("1700000000123").unwrap();
        assert_eq!(id.as_str(), "1700000000123");
        let id: SegmentId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.as_str(), "abc");
    }
}
