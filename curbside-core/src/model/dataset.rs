//! In-memory survey dataset

use log::debug;

use super::{Category, Polyline, Segment, SegmentForm, SegmentId, StudyArea};
use crate::Error;

/// Segments in creation order plus the active study area
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    segments: Vec<Segment>,
    boundary: Option<StudyArea>,
}

impl Dataset {
    pub fn new(segments: Vec<Segment>, boundary: Option<StudyArea>) -> Self {
        Self { segments, boundary }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment(&self, id: &SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| &s.id == id)
    }

    pub fn boundary(&self) -> Option<&StudyArea> {
        self.boundary.as_ref()
    }

    /// Replaces the study area wholesale
    pub fn set_boundary(&mut self, boundary: Option<StudyArea>) {
        self.boundary = boundary;
    }

    pub fn add(&mut self, segment: Segment) -> &Segment {
        debug!(
            "Adding segment {} ({:.1} m, capacity {})",
            segment.id,
            segment.length_m(),
            segment.capacity()
        );
        self.segments.push(segment);
        &self.segments[self.segments.len() - 1]
    }

    pub fn remove(&mut self, id: &SegmentId) -> Option<Segment> {
        let idx = self.segments.iter().position(|s| &s.id == id)?;
        Some(self.segments.remove(idx))
    }

    pub fn update_metadata(&mut self, id: &SegmentId, form: SegmentForm) -> Result<&Segment, Error> {
        let segment = self.segment_mut(id)?;
        segment.apply_form(form);
        Ok(segment)
    }

    pub fn edit_geometry(
        &mut self,
        id: &SegmentId,
        geometry: Polyline,
        meters_per_space: f64,
    ) -> Result<&Segment, Error> {
        let segment = self.segment_mut(id)?;
        segment.sync_geometry(geometry, meters_per_space)?;
        Ok(segment)
    }

    fn segment_mut(&mut self, id: &SegmentId) -> Result<&mut Segment, Error> {
        self.segments
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| Error::UnknownSegment(id.clone()))
    }

    /// Totals handed to report generators
    pub fn summary(&self) -> DatasetSummary {
        let per_category = Category::ALL
            .iter()
            .map(|&category| {
                let matching = self.segments.iter().filter(|s| s.category == category);
                matching.fold(
                    CategoryTotals {
                        category,
                        segment_count: 0,
                        length_m: 0.0,
                        capacity: 0,
                    },
                    |mut totals, s| {
                        totals.segment_count += 1;
                        totals.length_m += s.length_m();
                        totals.capacity += u64::from(s.capacity());
                        totals
                    },
                )
            })
            .collect::<Vec<_>>();

        DatasetSummary {
            segment_count: self.segments.len(),
            total_length_m: per_category.iter().map(|t| t.length_m).sum(),
            total_capacity: per_category.iter().map(|t| t.capacity).sum(),
            per_category,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub segment_count: usize,
    pub total_length_m: f64,
    pub total_capacity: u64,
    pub per_category: Vec<CategoryTotals>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotals {
    pub category: Category,
    pub segment_count: usize,
    pub length_m: f64,
    pub capacity: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::METERS_PER_SPACE;
    use crate::model::LatLng;

    fn segment(lng_span: f64) -> Segment {
        Segment::new(
            Polyline::new(vec![
                LatLng::new(52.0, 13.0),
                LatLng::new(52.0, 13.0 + lng_span),
            ]),
            METERS_PER_SPACE,
        )
        .unwrap()
    }

    #[test]
    fn add_update_remove() {
        let mut dataset = Dataset::default();
        let id = dataset.add(segment(0.001)).id.clone();
        assert_eq!(dataset.len(), 1);

        let form = SegmentForm {
            category: Category::ResidentsOnly,
            street_name: "Hauptstraße".to_string(),
            ..SegmentForm::default()
        };
        let updated = dataset.update_metadata(&id, form).unwrap();
        assert_eq!(updated.street_name, "Hauptstraße");

        assert!(dataset.remove(&id).is_some());
        assert!(dataset.is_empty());
        assert!(matches!(
            dataset.update_metadata(&id, SegmentForm::default()),
            Err(Error::UnknownSegment(_))
        ));
    }

    #[test]
    fn summary_groups_by_category() {
        let mut dataset = Dataset::default();
        dataset.add(segment(0.001));
        let mut residents = segment(0.002);
        residents.apply_form(SegmentForm {
            category: Category::ResidentsOnly,
            capacity: Some(4),
            ..SegmentForm::default()
        });
        dataset.add(residents);

        let summary = dataset.summary();
        assert_eq!(summary.segment_count, 2);
        assert_eq!(summary.per_category.len(), 3);
        let res = &summary.per_category[1];
        assert_eq!(res.category, Category::ResidentsOnly);
        assert_eq!(res.segment_count, 1);
        assert_eq!(res.capacity, 4);
        assert_eq!(summary.per_category[2].segment_count, 0);
        assert_eq!(
            summary.total_capacity,
            u64::from(dataset.segments()[0].capacity()) + 4
        );
        assert!(summary.total_length_m > 0.0);
    }
}
