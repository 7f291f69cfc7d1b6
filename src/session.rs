//! Annotation session: the state behind one map
//!
//! Owns the dataset, the active study area with its roads and guides, the
//! current draw session and the layer registry. Every input produces the
//! list of commands the drawing surface should apply.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use curbside_core::io::{
    dataset_from_json, dataset_to_json, segments_to_geojson, survey_to_geojson,
};
use curbside_core::{
    BoundingBox, Dataset, DatasetSummary, DrawSession, DrawState, GuideSet, LatLng, Polyline,
    RoadFeature, Segment, SegmentForm, SegmentId, SnapConfig, StudyArea, VertexOutcome,
};
use curbside_roads::{FetchError, RoadResponse};
use log::{debug, info, warn};

use crate::error::SessionError;
use crate::events::{ShapeKind, SurfaceCommand, SurfaceEvent};
use crate::loader::{FetchTicket, Resolution, RoadLoader};
use crate::registry::{LayerId, LayerKind, LayerRegistry};
use crate::store::{DATASET_KEY, KeyValueStore};

pub struct AnnotationSession {
    config: SnapConfig,
    dataset: Dataset,
    roads: Vec<RoadFeature>,
    guides: GuideSet,
    snapping: bool,
    draw: DrawSession,
    drawing: Option<ShapeKind>,
    layers: LayerRegistry,
    loader: RoadLoader,
    pending: VecDeque<FetchTicket>,
    last_error: Option<String>,
}

impl AnnotationSession {
    pub fn new(config: SnapConfig) -> Self {
        Self {
            draw: DrawSession::new(&config),
            config,
            dataset: Dataset::default(),
            roads: Vec::new(),
            guides: GuideSet::empty(),
            snapping: true,
            drawing: None,
            layers: LayerRegistry::new(),
            loader: RoadLoader::new(),
            pending: VecDeque::new(),
            last_error: None,
        }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn study_area(&self) -> Option<&StudyArea> {
        self.dataset.boundary()
    }

    pub fn roads(&self) -> &[RoadFeature] {
        &self.roads
    }

    pub fn guides(&self) -> &GuideSet {
        &self.guides
    }

    pub fn snapping_enabled(&self) -> bool {
        self.snapping
    }

    pub fn draw_state(&self) -> DrawState {
        self.draw.state()
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    /// Message of the most recent road-data failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn summary(&self) -> DatasetSummary {
        self.dataset.summary()
    }

    pub fn handle(&mut self, event: SurfaceEvent) -> Vec<SurfaceCommand> {
        match event {
            SurfaceEvent::DrawStart(kind) => {
                self.drawing = Some(kind);
                match kind {
                    ShapeKind::Segment => self.draw.start(),
                    ShapeKind::StudyArea => self.draw.cancel(),
                }
                Vec::new()
            }
            SurfaceEvent::VertexAdded(point) => self.vertex_added(point),
            SurfaceEvent::PointerMoved(point) => {
                if self.draw.state() != DrawState::Drawing {
                    return Vec::new();
                }
                let preview = self.draw.preview(point, &self.guides);
                if preview == point {
                    Vec::new()
                } else {
                    vec![SurfaceCommand::UpdatePreview(preview)]
                }
            }
            SurfaceEvent::DrawEnd => {
                self.drawing = None;
                self.draw.cancel();
                Vec::new()
            }
            SurfaceEvent::ShapeFinalized { kind, geometry } => {
                self.drawing = None;
                match kind {
                    ShapeKind::Segment => self.finalize_segment(Polyline::new(geometry)),
                    ShapeKind::StudyArea => {
                        self.draw.cancel();
                        self.set_study_area(geometry)
                    }
                }
            }
            SurfaceEvent::ShapeEdited { layer, geometry } => self.shape_edited(layer, geometry),
            SurfaceEvent::ShapeDeleted(layer) => self.shape_deleted(layer),
        }
    }

    fn vertex_added(&mut self, point: LatLng) -> Vec<SurfaceCommand> {
        if self.drawing != Some(ShapeKind::Segment) {
            return Vec::new();
        }
        match self.draw.place_vertex(point, &self.guides) {
            VertexOutcome::Snapped { point: to, .. } => vec![SurfaceCommand::MoveVertex {
                index: self.draw.vertices().len() - 1,
                to,
            }],
            VertexOutcome::Completed(_) => {
                let index = self.draw.vertices().len() - 1;
                let to = self.draw.vertices()[index];
                vec![
                    SurfaceCommand::MoveVertex { index, to },
                    SurfaceCommand::FinishDrawing,
                ]
            }
            VertexOutcome::Free(_) | VertexOutcome::Ignored => Vec::new(),
        }
    }

    fn finalize_segment(&mut self, freehand: Polyline) -> Vec<SurfaceCommand> {
        let Some(outcome) = self.draw.finish(&freehand, &self.guides) else {
            warn!("Discarding segment with {} points and no length", freehand.len());
            return vec![SurfaceCommand::Notify(
                "The line is too short to become a segment".to_string(),
            )];
        };

        let mut segment = match Segment::new(outcome.geometry, self.config.meters_per_space) {
            Ok(segment) => segment,
            Err(e) => {
                warn!("Discarding segment: {e}");
                return vec![SurfaceCommand::Notify(e.to_string())];
            }
        };
        if let Some(name) = outcome
            .guide
            .and_then(|id| self.guides.get(id))
            .and_then(|guide| guide.road_name.clone())
        {
            segment.street_name = name;
        }
        if outcome.routed {
            debug!("Segment {} routed across guides", segment.id);
        }

        let segment = self.dataset.add(segment);
        let geometry = segment.geometry().points().to_vec();
        let kind = LayerKind::Segment(segment.id.clone());
        let layer = self.layers.insert(kind.clone());
        vec![SurfaceCommand::AddLayer {
            layer,
            kind,
            geometry,
        }]
    }

    fn shape_edited(&mut self, layer: LayerId, geometry: Vec<LatLng>) -> Vec<SurfaceCommand> {
        match self.layers.get(layer).cloned() {
            Some(LayerKind::Segment(id)) => {
                let previous = self.dataset.segment(&id).map(|s| s.geometry().points().to_vec());
                match self.dataset.edit_geometry(
                    &id,
                    Polyline::new(geometry),
                    self.config.meters_per_space,
                ) {
                    Ok(_) => Vec::new(),
                    Err(e) => {
                        warn!("Rejected edit of segment {id}: {e}");
                        previous
                            .map(|geometry| SurfaceCommand::ReplaceGeometry { layer, geometry })
                            .into_iter()
                            .collect()
                    }
                }
            }
            Some(LayerKind::Boundary) => match StudyArea::new(geometry) {
                Ok(area) => self.replace_study_area(area, Some(layer)),
                Err(e) => {
                    warn!("Rejected study area edit: {e}");
                    let mut commands = vec![SurfaceCommand::Notify(e.to_string())];
                    if let Some(area) = self.dataset.boundary() {
                        commands.push(SurfaceCommand::ReplaceGeometry {
                            layer,
                            geometry: area.ring().to_vec(),
                        });
                    }
                    commands
                }
            },
            Some(LayerKind::Guide) => {
                debug!("Ignoring edit of guide {layer}");
                Vec::new()
            }
            None => {
                warn!("Edit for unknown {layer}");
                Vec::new()
            }
        }
    }

    fn shape_deleted(&mut self, layer: LayerId) -> Vec<SurfaceCommand> {
        match self.layers.get(layer).cloned() {
            Some(LayerKind::Segment(id)) => {
                self.layers.remove(layer);
                self.dataset.remove(&id);
                Vec::new()
            }
            Some(LayerKind::Boundary) => self.clear_study_area(),
            Some(LayerKind::Guide) | None => Vec::new(),
        }
    }

    /// Replaces the study area. Roads and guides of the old one are dropped
    /// and, with snapping on, a road fetch for the new box is scheduled.
    pub fn set_study_area(&mut self, ring: Vec<LatLng>) -> Vec<SurfaceCommand> {
        match StudyArea::new(ring) {
            Ok(area) => self.replace_study_area(area, None),
            Err(e) => {
                warn!("Rejected study area: {e}");
                vec![SurfaceCommand::Notify(e.to_string())]
            }
        }
    }

    fn replace_study_area(
        &mut self,
        area: StudyArea,
        keep_layer: Option<LayerId>,
    ) -> Vec<SurfaceCommand> {
        let mut commands = self.drop_guides();
        let bbox = area.bounding_box();
        let ring = area.ring().to_vec();
        self.dataset.set_boundary(Some(area));

        if keep_layer.is_none() {
            commands.extend(
                self.layers
                    .remove_where(|kind| *kind == LayerKind::Boundary)
                    .into_iter()
                    .map(SurfaceCommand::RemoveLayer),
            );
            let layer = self.layers.insert(LayerKind::Boundary);
            commands.push(SurfaceCommand::AddLayer {
                layer,
                kind: LayerKind::Boundary,
                geometry: ring,
            });
        }

        if self.snapping {
            self.request_roads(bbox);
        }
        commands
    }

    pub fn clear_study_area(&mut self) -> Vec<SurfaceCommand> {
        let mut commands = self.drop_guides();
        self.loader.deactivate();
        self.abandon_pending();
        self.dataset.set_boundary(None);
        commands.extend(
            self.layers
                .remove_where(|kind| *kind == LayerKind::Boundary)
                .into_iter()
                .map(SurfaceCommand::RemoveLayer),
        );
        commands
    }

    /// Turning snapping off discards roads and guides. Turning it back on
    /// schedules a fresh fetch for the active study area.
    pub fn set_snapping(&mut self, enabled: bool) -> Vec<SurfaceCommand> {
        if enabled == self.snapping {
            return Vec::new();
        }
        self.snapping = enabled;
        if !enabled {
            self.draw.cancel();
            self.loader.deactivate();
            self.abandon_pending();
            return self.drop_guides();
        }
        if let Some(bbox) = self.study_area().map(StudyArea::bounding_box) {
            self.request_roads(bbox);
        }
        Vec::new()
    }

    fn request_roads(&mut self, bbox: BoundingBox) {
        if let Some(ticket) = self.loader.request(bbox) {
            debug!("Scheduling road fetch #{}", ticket.generation);
            self.pending.push_back(ticket);
        }
    }

    /// Drops fetches nobody has started yet
    fn abandon_pending(&mut self) {
        for ticket in self.pending.drain(..) {
            self.loader.abandon(ticket);
        }
    }

    /// Next fetch to perform, if any
    pub fn take_fetch(&mut self) -> Option<FetchTicket> {
        self.pending.pop_front()
    }

    /// Applies the outcome of a fetch started from `ticket`.
    ///
    /// Results for a box that is no longer active are dropped silently.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<RoadResponse, FetchError>,
    ) -> Vec<SurfaceCommand> {
        let resolution = self.loader.resolve(ticket, result.is_ok());
        let next = match resolution {
            Resolution::Ignored => return Vec::new(),
            Resolution::Stale { next } => {
                debug!("Discarding roads for stale box (fetch #{})", ticket.generation);
                self.pending.extend(next);
                return Vec::new();
            }
            Resolution::Current { next } => next,
        };
        self.pending.extend(next);

        match result {
            Ok(response) => {
                self.last_error = None;
                self.roads = response.roads;
                self.rebuild_guides()
            }
            Err(e) => {
                warn!("Road fetch failed: {e}");
                let message = SessionError::from(e).to_string();
                self.last_error = Some(message.clone());
                let mut commands = self.drop_guides();
                commands.push(SurfaceCommand::Notify(message));
                commands
            }
        }
    }

    fn rebuild_guides(&mut self) -> Vec<SurfaceCommand> {
        let mut commands = self.clear_guide_layers();
        let Some(area) = self.dataset.boundary() else {
            return commands;
        };
        self.guides = GuideSet::build(&self.roads, area, &self.config);
        info!(
            "{} guides ready from {} roads",
            self.guides.len(),
            self.roads.len()
        );

        let shown = self
            .guides
            .guides()
            .iter()
            .map(|guide| {
                (
                    self.layers.insert(LayerKind::Guide),
                    guide.geometry.points().to_vec(),
                )
            })
            .collect::<Vec<_>>();
        if !shown.is_empty() {
            commands.push(SurfaceCommand::ShowGuides(shown));
        }
        commands
    }

    fn drop_guides(&mut self) -> Vec<SurfaceCommand> {
        self.roads.clear();
        self.clear_guide_layers()
    }

    fn clear_guide_layers(&mut self) -> Vec<SurfaceCommand> {
        self.guides = GuideSet::empty();
        if self
            .layers
            .remove_where(|kind| *kind == LayerKind::Guide)
            .is_empty()
        {
            Vec::new()
        } else {
            vec![SurfaceCommand::ClearGuides]
        }
    }

    pub fn update_segment(
        &mut self,
        id: &SegmentId,
        form: SegmentForm,
    ) -> Result<&Segment, SessionError> {
        Ok(self.dataset.update_metadata(id, form)?)
    }

    pub fn delete_segment(&mut self, id: &SegmentId) -> Result<Vec<SurfaceCommand>, SessionError> {
        if self.dataset.remove(id).is_none() {
            return Err(curbside_core::Error::UnknownSegment(id.clone()).into());
        }
        Ok(self
            .layers
            .segment_layer(id)
            .and_then(|layer| self.layers.remove(layer).map(|_| layer))
            .map(SurfaceCommand::RemoveLayer)
            .into_iter()
            .collect())
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), SessionError> {
        self.save_at(store, Utc::now())
    }

    pub fn save_at(
        &self,
        store: &mut dyn KeyValueStore,
        saved_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let json = dataset_to_json(&self.dataset, saved_at)?;
        store.set(DATASET_KEY, &json)?;
        info!("Saved {} segments", self.dataset.len());
        Ok(())
    }

    /// Restores the stored dataset. Nothing stored leaves the session as is.
    pub fn load(&mut self, store: &dyn KeyValueStore) -> Result<Vec<SurfaceCommand>, SessionError> {
        match store.get(DATASET_KEY)? {
            Some(json) => self.import_json(&json),
            None => Ok(Vec::new()),
        }
    }

    /// Replaces the dataset with a saved document or a legacy segment array.
    /// Without a stored study area the current one stays active.
    pub fn import_json(&mut self, json: &str) -> Result<Vec<SurfaceCommand>, SessionError> {
        let mut dataset = dataset_from_json(json)?;
        let boundary = dataset.boundary().cloned();
        dataset.set_boundary(self.dataset.boundary().cloned());
        self.dataset = dataset;

        let mut commands: Vec<SurfaceCommand> = self
            .layers
            .remove_where(|kind| matches!(kind, LayerKind::Segment(_)))
            .into_iter()
            .map(SurfaceCommand::RemoveLayer)
            .collect();
        for segment in self.dataset.segments() {
            let kind = LayerKind::Segment(segment.id.clone());
            let layer = self.layers.insert(kind.clone());
            commands.push(SurfaceCommand::AddLayer {
                layer,
                kind,
                geometry: segment.geometry().points().to_vec(),
            });
        }

        if let Some(area) = boundary
            && self.dataset.boundary() != Some(&area)
        {
            commands.extend(self.replace_study_area(area, None));
        }

        info!("Loaded {} segments", self.dataset.len());
        Ok(commands)
    }

    /// The segments as a GeoJSON `FeatureCollection` string
    pub fn export_geojson(&self) -> Result<String, SessionError> {
        let collection = segments_to_geojson(self.dataset.segments())?;
        Self::geojson_string(&collection)
    }

    /// Same as [`Self::export_geojson`] plus the study area as a final polygon
    pub fn export_geojson_with_boundary(&self) -> Result<String, SessionError> {
        let collection = survey_to_geojson(self.dataset.segments(), self.dataset.boundary())?;
        Self::geojson_string(&collection)
    }

    fn geojson_string(collection: &geojson::FeatureCollection) -> Result<String, SessionError> {
        serde_json::to_string(collection)
            .map_err(|e| SessionError::Core(curbside_core::Error::Json(e)))
    }
}
